use nevermind_seg::err::*;

use log::info;

use clap::ArgMatches;

use crate::provider_cfg;

pub fn gen_cfg(args: &ArgMatches) -> Result<()> {
    let cfg = provider_cfg(args)?;

    let out_file = args
        .get_one::<String>("OutFile")
        .ok_or_else(|| ProviderError::WrongArg("missing output file".to_string()))?;

    cfg.to_file(out_file)?;
    info!("Provider configuration written to {}", out_file);

    Ok(())
}
