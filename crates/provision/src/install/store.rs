//! Microsoft Store installs via winget's msstore source, with a plain
//! winget invocation as the second candidate.

use anyhow::Result;

use super::{Resolution, cascade, winget};
use crate::context::Context;
use crate::item::Item;

pub(crate) fn install(item: &Item, ctx: &Context) -> Result<Resolution> {
    let store_args: Vec<String> = [
        "install",
        "--id",
        item.identifier(),
        "--source",
        "msstore",
        "--accept-package-agreements",
        "--accept-source-agreements",
    ]
    .map(String::from)
    .to_vec();

    let won = cascade([
        (
            "msstore source",
            Box::new(|| winget::run(ctx, &store_args)) as Box<dyn FnOnce() -> Result<()> + '_>,
        ),
        (
            "default winget source",
            Box::new(|| winget::install(item, ctx).map(|_| ())),
        ),
    ])?;

    Ok(Resolution::Done(format!("installed ({won})")))
}
