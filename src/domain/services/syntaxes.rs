#[cfg(test)]
#[path = "syntaxes_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use once_cell::sync::Lazy;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

pub static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

pub struct Syntaxes {}

impl Syntaxes {
    pub fn lua() -> &'static SyntaxReference {
        return SYNTAX_SET
            .find_syntax_by_extension("lua")
            .unwrap_or_else(|| return SYNTAX_SET.find_syntax_plain_text());
    }

    pub fn themes() -> Vec<String> {
        let mut themes = THEME_SET
            .themes
            .keys()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        themes.sort();

        return themes;
    }

    pub fn theme(name: &str) -> Result<&'static Theme> {
        if let Some(theme) = THEME_SET.themes.get(name) {
            return Ok(theme);
        }

        bail!(format!("Theme {name} does not exist"));
    }

    pub fn translate_colour(colour: syntect::highlighting::Color) -> Option<Color> {
        if colour.a == 0 {
            return None;
        }

        return Some(Color::Rgb(colour.r, colour.g, colour.b));
    }

    /// Highlights a Lua script line by line. Lines that fail to highlight are
    /// kept as plain text.
    pub fn highlight_lua(script: &str, theme: &Theme) -> Vec<Line<'static>> {
        let mut highlight = HighlightLines::new(Syntaxes::lua(), theme);

        return script
            .lines()
            .map(|line| {
                // Multi-line comments only highlight correctly with the newline kept.
                let line_nl = format!("{line}\n");
                let spans = match highlight.highlight_line(&line_nl, &SYNTAX_SET) {
                    Ok(segments) => segments
                        .iter()
                        .map(|(style, content)| {
                            return Span::styled(
                                content.trim_end_matches('\n').to_string(),
                                Style {
                                    fg: Syntaxes::translate_colour(style.foreground),
                                    ..Style::default()
                                },
                            );
                        })
                        .collect::<Vec<Span>>(),
                    Err(err) => {
                        tracing::debug!(error = ?err, "Failed to highlight line");
                        vec![Span::raw(line.to_string())]
                    }
                };

                return Line::from(spans);
            })
            .collect();
    }
}
