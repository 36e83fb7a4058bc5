use tui::{
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::Paragraph,
};

use crate::utils::breadcrumbs;

/// Single line trail from the bucket root to the current prefix
pub struct Breadcrumb;

impl Breadcrumb {
    pub fn spans(bucket_name: &str, path: &str) -> Spans<'static> {
        let crumbs = breadcrumbs(path);
        let separator = Span::styled(" / ", Style::default().fg(Color::DarkGray));
        let active = Style::default().add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(
            format!("{} ", bucket_name),
            Style::default().fg(Color::Cyan),
        )];
        if crumbs.is_empty() {
            spans.push(Span::styled("Home", active));
        } else {
            spans.push(Span::raw("Home"));
        }
        let last = crumbs.len().saturating_sub(1);
        for (i, crumb) in crumbs.into_iter().enumerate() {
            spans.push(separator.clone());
            if i == last {
                spans.push(Span::styled(crumb.to_owned(), active));
            } else {
                spans.push(Span::raw(crumb.to_owned()));
            }
        }
        Spans::from(spans)
    }

    pub fn make_paragraph(bucket_name: &str, path: &str) -> Paragraph<'static> {
        Paragraph::new(Self::spans(bucket_name, path))
    }
}

#[cfg(test)]
mod tests {
    use super::Breadcrumb;

    fn text(bucket: &str, path: &str) -> String {
        Breadcrumb::spans(bucket, path)
            .0
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn root_shows_home_only() {
        assert_eq!(text("public-data", ""), "public-data Home");
    }

    #[test]
    fn nested_path_lists_every_segment() {
        assert_eq!(
            text("public-data", "docs/images/"),
            "public-data Home / docs / images"
        );
    }
}
