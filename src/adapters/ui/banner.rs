//! Startup banner: "BULK-SMS" in figlet standard font with a vertical gradient.

use crossterm::QueueableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Signal Orange (#ff7a00).
const SIGNAL_ORANGE: (u8, u8, u8) = (0xff, 0x7a, 0x00);
/// Carrier Yellow (#ffd400).
const CARRIER_YELLOW: (u8, u8, u8) = (0xff, 0xd4, 0x00);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Banner art, or the plain title when the font cannot render it.
fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("BULK-SMS").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "BULK-SMS\n".to_string())
}

/// Writes one line in the given colour. Terminal errors are ignored.
fn paint_line(out: &mut impl Write, (r, g, b): (u8, u8, u8), text: &str) {
    let _ = out
        .queue(SetForegroundColor(Color::Rgb { r, g, b }))
        .and_then(|o| o.queue(Print(text)))
        .and_then(|o| o.queue(Print("\r\n")))
        .and_then(|o| o.queue(ResetColor));
}

pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let lines: Vec<&str> = art.lines().collect();
    let last = lines.len().saturating_sub(1).max(1) as f64;

    for (i, line) in lines.iter().enumerate() {
        let color = lerp_rgb(SIGNAL_ORANGE, CARRIER_YELLOW, i as f64 / last);
        paint_line(&mut out, color, line);
    }
    paint_line(
        &mut out,
        CARRIER_YELLOW,
        &format!("v{}  bulk SMS dispatch", env!("CARGO_PKG_VERSION")),
    );
    let _ = out.flush();
}
