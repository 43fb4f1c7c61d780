//! Validate a scene file.

use std::path::PathBuf;
use std::sync::Arc;

use instavid_common::clock::MonotonicClock;
use instavid_render_engine::FontBook;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating scene at {}", path.display());

    let scene = super::load_scene(&path)?;
    println!("[OK] scene.json parsed (duration {:.1}s)", scene.duration);

    let editor = super::open_editor(&scene, MonotonicClock::start(), Arc::new(FontBook::empty()));

    let mut errors = 0;
    for element in editor.elements() {
        if let Err(e) = element.validate() {
            errors += 1;
            println!("[ERR] #{} {}: {e}", element.id.0, element.name);
        }
    }
    if errors == 0 {
        println!("[OK] {} elements valid", editor.elements().len());
    }

    for element in editor.overruns() {
        println!(
            "[WARN] #{} {} ends at {:.2}s, past the {:.1}s timeline",
            element.id.0,
            element.name,
            element.end_time(),
            editor.duration()
        );
    }

    if errors > 0 {
        anyhow::bail!("{errors} invalid element(s)");
    }
    println!("Scene is valid.");
    Ok(())
}
