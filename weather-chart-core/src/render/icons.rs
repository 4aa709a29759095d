//! Weather icon sizing and placement.

use crate::session::{DrawnIcon, RenderSession};

const MIN_ICON_SIZE: u32 = 16;
const MAX_ICON_SIZE: u32 = 64;
const DEFAULT_ICON_SIZE: u32 = 32;

pub fn icon_url(base_url: &str, id: &str) -> String {
    if base_url.is_empty() {
        return format!("{id}.svg");
    }
    format!("{}/{id}.svg", base_url.trim_end_matches('/'))
}

/// Icon size fitting the tightest spacing between consecutive samples.
pub fn auto_icon_size(xs: &[f64]) -> u32 {
    let spacing = xs
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !spacing.is_finite() {
        return DEFAULT_ICON_SIZE;
    }
    (spacing.floor() as u32).clamp(MIN_ICON_SIZE, MAX_ICON_SIZE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconPlacement {
    pub url: String,
    /// Centre of the icon.
    pub x: f64,
    /// Top edge of the icon.
    pub y: f64,
    pub size: u32,
}

/// Choose which icons to draw at `(x, id)` positions.
///
/// An icon is skipped when it would overlap the previously drawn one, or
/// when it repeats the previous icon less than two icon widths away.
pub fn place_icons<'a>(
    candidates: impl IntoIterator<Item = (f64, &'a str)>,
    size: u32,
    y: f64,
    base_url: &str,
    session: &mut RenderSession,
) -> Vec<IconPlacement> {
    let width = f64::from(size);
    let mut placed = Vec::new();

    for (x, id) in candidates {
        if let Some(last) = &session.last_icon {
            let distance = x - last.x;
            if distance < width || (last.id == id && distance < 2.0 * width) {
                continue;
            }
        }

        placed.push(IconPlacement { url: icon_url(base_url, id), x, y, size });
        session.last_icon = Some(DrawnIcon { id: id.to_string(), x });
    }

    placed
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `<image>` elements for the placed icons.
pub fn image_elements(icons: &[IconPlacement]) -> String {
    icons
        .iter()
        .map(|icon| {
            format!(
                r#"<image class="weather-icon" href="{}" x="{:.1}" y="{:.1}" width="{}" height="{}"/>"#,
                escape_attr(&icon.url),
                icon.x - f64::from(icon.size) / 2.0,
                icon.y,
                icon.size,
                icon.size,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert `fragment` just before the closing `</svg>` tag.
pub fn splice_into_svg(mut svg: String, fragment: &str) -> String {
    if fragment.is_empty() {
        return svg;
    }
    match svg.rfind("</svg>") {
        Some(pos) => {
            svg.insert_str(pos, &format!("{fragment}\n"));
            svg
        }
        None => svg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_id() {
        assert_eq!(icon_url("https://cdn.example/icons/", "10d"), "https://cdn.example/icons/10d.svg");
        assert_eq!(icon_url("", "01n"), "01n.svg");
    }

    #[test]
    fn auto_size_clamps_to_spacing() {
        assert_eq!(auto_icon_size(&[0.0, 10.0, 20.0]), 16);
        assert_eq!(auto_icon_size(&[0.0, 40.5, 90.0]), 40);
        assert_eq!(auto_icon_size(&[0.0, 500.0]), 64);
        assert_eq!(auto_icon_size(&[12.0]), 32);
    }

    #[test]
    fn overlapping_icons_are_skipped() {
        let mut session = RenderSession::new();
        let candidates = [(0.0, "01d"), (10.0, "02d"), (20.0, "03d"), (40.0, "04d")];

        let placed = place_icons(candidates, 20, 0.0, "i", &mut session);
        let xs: Vec<_> = placed.iter().map(|p| p.x).collect();

        assert_eq!(xs, vec![0.0, 20.0, 40.0]);
        assert_eq!(session.last_icon, Some(DrawnIcon { id: "04d".into(), x: 40.0 }));
    }

    #[test]
    fn repeated_icon_needs_more_room() {
        let mut session = RenderSession::new();
        let candidates = [(0.0, "01d"), (20.0, "01d"), (40.0, "01d"), (60.0, "02d")];

        let placed = place_icons(candidates, 20, 0.0, "i", &mut session);
        let xs: Vec<_> = placed.iter().map(|p| p.x).collect();

        assert_eq!(xs, vec![0.0, 40.0, 60.0]);
    }

    #[test]
    fn images_are_spliced_before_closing_tag() {
        let icons = [IconPlacement { url: "a&b/01d.svg".into(), x: 50.0, y: 4.0, size: 20 }];
        let svg = splice_into_svg("<svg>\n</svg>\n".to_string(), &image_elements(&icons));

        assert!(svg.contains(r#"href="a&amp;b/01d.svg" x="40.0" y="4.0""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
