use anyhow::Result;

use folio_core::timeline::{BuildInput, PageTimelineBuilder};
use folio_core::FolioConfig;

pub fn run(config: &FolioConfig, abbreviated: bool, json: bool) -> Result<()> {
    let builder = PageTimelineBuilder::new(config.book.ratios());
    let timeline = builder.build(BuildInput {
        page_count: config.book.page_count,
        layout: config.book.layout(),
        abbreviated,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(timeline.segments())?);
        return Ok(());
    }

    println!(
        "Timeline ({} pages, {} segments{}):\n",
        config.book.page_count,
        timeline.len(),
        if abbreviated { ", abbreviated" } else { "" }
    );
    println!(
        "  {:<24} {:<10} {:>8} {:>8} {:>9} {:>9}  easing",
        "target", "property", "from", "to", "start", "end"
    );
    for segment in timeline.segments() {
        println!(
            "  {:<24} {:<10} {:>8.2} {:>8.2} {:>9.4} {:>9.4}  {:?}",
            segment.target.to_string(),
            format!("{:?}", segment.property),
            segment.from,
            segment.to,
            segment.start,
            segment.end(),
            segment.easing
        );
    }

    Ok(())
}
