use super::{Link, LinkKind, RenderEvent};

/// Produces the text displayed for a link that has no content of its own
pub trait LinkLabelGenerator {
    fn generate(&self, link: &Link) -> String;
}

impl<T: LinkLabelGenerator + ?Sized> LinkLabelGenerator for &T {
    fn generate(&self, link: &Link) -> String {
        (**self).generate(link)
    }
}

/// Document links are labelled with the page name, everything else with the
/// reference as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLinkLabels;

impl LinkLabelGenerator for DefaultLinkLabels {
    fn generate(&self, link: &Link) -> String {
        match link.kind {
            LinkKind::Document => {
                let target = link.reference.split('#').next().unwrap_or_default();
                let page = target.rsplit('/').next().unwrap_or(target);
                page.strip_suffix(".md").unwrap_or(page).to_string()
            }
            LinkKind::Url | LinkKind::Email => link.reference.clone(),
        }
    }
}

/// Tracks whether the link currently being rendered has any content.
///
/// Every pass over a stream runs its own tracker so that all of them agree
/// on which links get a generated label.
#[derive(Debug, Default)]
pub struct LinkTracker {
    empty: Vec<bool>,
}

impl LinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next event. Returns `Some(was_empty)` when `event` ends a link.
    pub fn observe(&mut self, event: &RenderEvent) -> Option<bool> {
        match event {
            RenderEvent::BeginLink(_) => {
                self.mark_content();
                self.empty.push(true);
                None
            }
            RenderEvent::EndLink { .. } => {
                let was_empty = self.empty.pop().unwrap_or(false);
                self.mark_content();
                Some(was_empty)
            }
            _ => {
                self.mark_content();
                None
            }
        }
    }

    fn mark_content(&mut self) {
        for empty in &mut self.empty {
            *empty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn end(link: &Link) -> RenderEvent {
        RenderEvent::EndLink {
            link: link.clone(),
            free_standing: false,
        }
    }

    #[test]
    fn link_without_content_is_empty() {
        let link = Link::new(LinkKind::Url, "https://example.com");
        let mut tracker = LinkTracker::new();

        assert_eq!(tracker.observe(&RenderEvent::BeginLink(link.clone())), None);
        assert_eq!(tracker.observe(&end(&link)), Some(true));
    }

    #[test]
    fn link_with_a_word_is_not_empty() {
        let link = Link::new(LinkKind::Url, "https://example.com");
        let mut tracker = LinkTracker::new();

        tracker.observe(&RenderEvent::BeginLink(link.clone()));
        tracker.observe(&RenderEvent::word("site"));
        assert_eq!(tracker.observe(&end(&link)), Some(false));
    }

    #[test]
    fn nested_empty_link_fills_its_parent() {
        let outer = Link::new(LinkKind::Url, "outer");
        let inner = Link::new(LinkKind::Url, "inner");
        let mut tracker = LinkTracker::new();

        tracker.observe(&RenderEvent::BeginLink(outer.clone()));
        tracker.observe(&RenderEvent::BeginLink(inner.clone()));
        assert_eq!(tracker.observe(&end(&inner)), Some(true));
        assert_eq!(tracker.observe(&end(&outer)), Some(false));
    }

    #[rstest]
    #[case(LinkKind::Document, "Space/Page Name", "Page Name")]
    #[case(LinkKind::Document, "notes/robots.md#laws", "robots")]
    #[case(LinkKind::Url, "https://example.com/a", "https://example.com/a")]
    #[case(LinkKind::Email, "mailto:a@b.c", "mailto:a@b.c")]
    fn default_labels(#[case] kind: LinkKind, #[case] reference: &str, #[case] expected: &str) {
        assert_eq!(
            DefaultLinkLabels.generate(&Link::new(kind, reference)),
            expected
        );
    }
}
