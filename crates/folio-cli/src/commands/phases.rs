use anyhow::{bail, Result};

use folio_core::mapper::{map_progress, page_progress};
use folio_core::phase::{CONTACT_FADE_START, CONTACT_SETTLED, COVER_END};
use folio_core::{FolioConfig, PageSlots, Phase, ScrollBounds};

pub fn run(config: &FolioConfig, at: Option<f64>) -> Result<()> {
    let slots = PageSlots::new(config.book.page_count, config.book.ratios())?;

    if let Some(p) = at {
        if !(0.0..=1.0).contains(&p) {
            bail!("Progress must be within [0, 1], got {}", p);
        }
        // Unit bounds: offsets read as progress
        let bounds = ScrollBounds::new(0.0, 1.0);
        let state = map_progress(p, slots.len(), p, bounds);
        println!("Progress:        {:.4} ({:?})", p, Phase::at(p));
        println!("Page progress:   {:.4}", page_progress(p, slots.len()));
        println!("Current page:    {} of {}", state.current_page_index + 1, slots.len());
        println!("Contact opacity: {:.3}", state.contact_opacity);
        println!("Interactive:     {}", state.contact_interactive);
        match state.scroll_clamp {
            Some(limit) => println!("Clamp:           back to {:.4}", limit),
            None => println!("Clamp:           none"),
        }
        return Ok(());
    }

    println!("Phase map:");
    println!("  cover            [0.0000, {:.4})", COVER_END);
    println!("  pages            [{:.4}, {:.4})", COVER_END, CONTACT_SETTLED);
    println!("  contact fade     [{:.4}, {:.4})", CONTACT_FADE_START, CONTACT_SETTLED);
    println!("  contact settled  [{:.4}, 1.0000]", CONTACT_SETTLED);
    println!();
    println!(
        "Page slots ({} pages, window {:.4}, content {:.0}% / flip {:.0}%):",
        slots.len(),
        slots.window(),
        slots.ratios().content * 100.0,
        slots.ratios().flip * 100.0
    );
    for slot in slots.iter() {
        println!(
            "  page {:>2}  [{:.4}, {:.4})  flip from {:.4}",
            slot.index + 1,
            slot.start,
            slot.end(),
            slot.flip_start()
        );
    }

    Ok(())
}
