use perfline_tracker::TimelineStore;

use crate::error::Result;
use crate::AppContext;

pub fn run(ctx: &AppContext) -> Result<()> {
    let store = TimelineStore::open(&ctx.backend, &ctx.registry.name)?;

    if store.is_empty() {
        ctx.output.print_info(&format!(
            "No timeline entries for profile '{}'.",
            ctx.registry.name
        ));
        return Ok(());
    }

    ctx.output.print_timeline(store.entries(), &ctx.registry)
}
