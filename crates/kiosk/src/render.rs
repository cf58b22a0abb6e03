//! Plain-text rendering of a [`RotationView`] for the terminal kiosk.

use std::fmt::Write;

use poster_core::poster::PosterRecord;
use poster_core::rotation::Phase;

use crate::controller::RotationView;

/// Human-readable form of an image reference. Embedded data URLs are
/// summarised instead of printed.
pub fn describe_image(src: &str) -> String {
    match src.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split([';', ',']).next().unwrap_or("image");
            format!("embedded {mime} ({} bytes)", src.len())
        }
        None => src.to_string(),
    }
}

/// Render the whole screen.
pub fn render_view(view: &RotationView) -> String {
    let mut out = String::new();
    match (&view.phase, &view.current) {
        (Phase::Loading, _) => out.push_str("Loading posters..."),
        (Phase::Failed(message), _) => {
            let _ = write!(out, "Failed to load posters: {message}\nRetrying...");
        }
        (Phase::Empty, _) | (Phase::Ready, None) => {
            out.push_str("No posters yet. Add some from the admin page.");
        }
        (Phase::Ready, Some(poster)) => {
            let position = view.position.as_deref().unwrap_or("");
            let _ = writeln!(
                out,
                "[{position}] every {}s",
                view.cycle_speed_secs
            );
            render_poster(&mut out, poster);
        }
    }

    if let Some(notice) = &view.notice {
        let _ = write!(out, "\n! {notice}");
    }
    out
}

fn render_poster(out: &mut String, poster: &PosterRecord) {
    let _ = writeln!(out, "{}", poster.name);
    let _ = writeln!(out, "  poster: {}", describe_image(poster.poster_src()));
    let _ = writeln!(out, "  logo:   {}", describe_image(poster.logo_src()));

    for (label, value) in [
        ("Starring", &poster.starring),
        ("Director", &poster.director),
        ("Runtime", &poster.runtime),
        ("Genre", &poster.genre),
        ("Rating", &poster.rating),
    ] {
        if !value.is_empty() {
            let _ = writeln!(out, "  {label}: {value}");
        }
    }
    if !poster.description.is_empty() {
        let _ = write!(out, "\n{}", poster.description);
    }
}
