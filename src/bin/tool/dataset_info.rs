use nevermind_seg::err::*;
use nevermind_seg::prelude::*;
use nevermind_seg::util::array_helpers::{count_positive, value_range};

use log::error;

use clap::ArgMatches;

use crate::provider_cfg;

pub fn dataset_info(args: &ArgMatches) -> Result<()> {
    let cfg = provider_cfg(args)?;

    if cfg.search_path.is_empty() {
        error!("Search path wasn't provided (--search_path or --config)");
        return Err(ProviderError::WrongArg("missing search path".to_string()));
    }

    let mut provider = ImageDataProvider::from_config(&cfg)?;

    println!("Dataset length : {}", provider.files().len());
    println!("Channels : {}", provider.channels());
    println!("Classes : {}", provider.n_class());

    let mut params: Vec<_> = provider.cfg().into_iter().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, val) in params {
        println!("  {} : {:?}", key, val);
    }

    let show_n = *args.get_one::<usize>("ShowN").unwrap_or(&0);

    for _ in 0..show_n {
        let (img, mask) = provider.next_data()?;

        let file = provider
            .current_file()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let (min, max) = value_range(&img).unwrap_or((0.0, 0.0));

        println!(
            "{} : image {:?} [{} .. {}], mask {:?} positives {}",
            file,
            img.shape(),
            min,
            max,
            mask.shape(),
            count_positive(&mask)
        );
    }

    Ok(())
}
