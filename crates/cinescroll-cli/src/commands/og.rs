use anyhow::{bail, Result};

use cinescroll_core::{content::Catalog, og, AppConfig};

pub fn run(catalog: &Catalog, config: &AppConfig, id: &str) -> Result<()> {
    let response = og::respond(catalog, &config.site, Some(id));

    if response.status != 200 {
        bail!("{}: {}", response.status, response.body);
    }

    print!("{}", response.body);
    Ok(())
}
