use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::annotation::{Annotation, AnnotationId};
use crate::events::{EventKind, EventRef};
use crate::markdown;
use crate::render::HtmlRenderer;
use crate::tests::{Transcript, paragraph};

const FIRST_LAW: &str = "A robot may not injure a human being";

fn align(events: Vec<RenderEvent>, annotations: &[Annotation]) -> (Transcript, LocateReport) {
    let mut transcript = Transcript::default();
    let report = Aligner::new()
        .align("doc", events, annotations, &mut transcript)
        .unwrap();
    (transcript, report)
}

fn assert_well_nested(markers: &[String]) {
    let mut stack = Vec::new();
    for marker in markers {
        if let Some(id) = marker.strip_prefix('+') {
            stack.push(id);
        } else if let Some(id) = marker.strip_prefix('-') {
            assert_eq!(stack.pop(), Some(id), "markers: {markers:?}");
        }
    }
    assert!(stack.is_empty(), "unclosed markers: {markers:?}");
}

#[test]
fn single_annotation_wraps_its_words() {
    let annotations = [Annotation::new("law", "robot may not").with_context(FIRST_LAW)];

    let (transcript, report) = align(paragraph(FIRST_LAW), &annotations);

    assert_eq!(
        transcript.compact(),
        "< A [law robot may not law] injure a human being >"
    );
    assert_eq!(
        report.located[0].start,
        EventPosition {
            event: EventRef::new(EventKind::Word, 1),
            offset: 0,
        }
    );
    assert_eq!(
        report.located[0].end,
        EventPosition {
            event: EventRef::new(EventKind::Word, 3),
            offset: 2,
        }
    );
}

#[test]
fn overlapping_annotations_are_split_to_nest() {
    let annotations = [
        Annotation::new("A", "alpha bravo").with_context("alpha bravo charlie"),
        Annotation::new("B", "bravo charlie").with_context("alpha bravo charlie"),
    ];

    let (transcript, _) = align(paragraph("alpha bravo charlie delta"), &annotations);

    assert_eq!(
        transcript.markers(),
        vec!["+A", "+B", "-B", "-A", "+B", "-B"]
    );
    assert_eq!(
        transcript.compact(),
        "< [A alpha [B bravo B] A] [B charlie B] delta >"
    );
}

#[test]
fn structural_boundary_closes_and_reopens_markers() {
    let annotations = [
        Annotation::new("X", "robot may not injure"),
        Annotation::new("Y", "may not"),
    ];

    let (transcript, _) = align(markdown::events("A robot *may not* injure"), &annotations);

    assert_eq!(
        transcript.compact(),
        "< A [X robot X] < [X [Y may not Y] X] > [X injure X] >"
    );
}

#[test]
fn structural_boundary_in_xhtml() {
    let annotations = [
        Annotation::new("X", "robot may not injure"),
        Annotation::new("Y", "may not"),
    ];
    let mut renderer = HtmlRenderer::new().with_title(false);

    Aligner::new()
        .align(
            "doc",
            markdown::events("A robot *may not* injure"),
            &annotations,
            &mut renderer,
        )
        .unwrap();

    assert_snapshot!(renderer.into_string(), @r#"<p>A <span class="annotation IDX">robot </span><em><span class="annotation IDX"><span class="annotation IDY">may not</span></span></em><span class="annotation IDX"> injure</span></p>"#);
}

#[test]
fn markers_stripped_give_back_the_stream() {
    let events = markdown::events("# Laws\n\nA robot *may not* injure a [human](h) being.\n");
    let annotations = [
        Annotation::new("1", "Laws A robot"),
        Annotation::new("2", "injure a human being"),
        Annotation::new("3", "may"),
    ];

    let (transcript, report) = align(events.clone(), &annotations);

    assert_eq!(report.located.len(), 3);
    assert_eq!(transcript.events(), events);
    assert_well_nested(&transcript.markers());
}

#[test]
fn locating_twice_gives_the_same_report() {
    let aligner = Aligner::new();
    let stream = aligner.record(paragraph(FIRST_LAW));
    let annotations = [
        Annotation::new("1", "a human"),
        Annotation::new("2", "robot may"),
        Annotation::new("3", "android"),
    ];

    assert_eq!(
        aligner.locate(&stream, &annotations),
        aligner.locate(&stream, &annotations)
    );
}

#[test]
fn many_overlaps_stay_nested() {
    let text = "one two three four five six seven eight nine ten";
    let annotations = [
        Annotation::new("a", "one two three four"),
        Annotation::new("b", "three four five six"),
        Annotation::new("c", "four"),
        Annotation::new("d", "five six seven eight nine"),
        Annotation::new("e", "two three four five six seven"),
        Annotation::new("f", "nine ten"),
    ];

    let (transcript, report) = align(paragraph(text), &annotations);

    assert_eq!(report.located.len(), annotations.len());
    assert_well_nested(&transcript.markers());
    // every annotation is opened at least once
    for annotation in &annotations {
        assert!(
            transcript
                .markers()
                .contains(&format!("+{}", annotation.id))
        );
    }
}

#[rstest]
#[case::at_document_start("A", "[s A s] robot may not injure a human being")]
#[case::at_last_char("being", "A robot may not injure a human [s being s]")]
#[case::inside_a_word("obo", "A [s robot s] may not injure a human being")]
#[case::whole_context("A robot may not injure a human being", "[s A robot may not injure a human being s]")]
fn boundary_selections(#[case] selection: &str, #[case] expected: &str) {
    let annotations = [Annotation::new("s", selection).with_context(FIRST_LAW)];

    let (transcript, _) = align(paragraph(FIRST_LAW), &annotations);

    assert_eq!(transcript.compact(), format!("< {expected} >"));
}

#[test]
fn unlocatable_annotations_do_not_disturb_the_others() {
    let good = Annotation::new("good", "human being");
    let all = [
        Annotation::new("missing", "android"),
        good.clone(),
        Annotation::new("blank", "   "),
        Annotation::new("outside", "cyborg").with_context("a human being"),
    ];

    let (alone, _) = align(paragraph(FIRST_LAW), std::slice::from_ref(&good));
    let (mixed, report) = align(paragraph(FIRST_LAW), &all);

    assert_eq!(mixed.emitted, alone.emitted);
    assert_eq!(
        report
            .unlocatable
            .iter()
            .map(|unlocated| (unlocated.id.as_str(), unlocated.reason.clone()))
            .collect::<Vec<_>>(),
        vec![
            ("missing", Unlocatable::ContextNotFound),
            ("blank", Unlocatable::EmptyContext),
            ("outside", Unlocatable::SelectionNotInContext),
        ]
    );
}

#[test]
fn empty_link_label_can_be_annotated() {
    let annotations = [Annotation::new("a", "example").with_context("https://example.com")];
    let mut renderer = HtmlRenderer::new().with_title(false);

    let report = Aligner::new()
        .align(
            "doc",
            markdown::events("See [](https://example.com) now"),
            &annotations,
            &mut renderer,
        )
        .unwrap();

    assert_eq!(
        report.located[0].start.event,
        EventRef::new(EventKind::LinkLabel, 0)
    );
    assert_snapshot!(renderer.into_string(), @r#"<p>See <span class="annotation IDa"><a href="https://example.com">https://example.com</a></span> now</p>"#);
}

#[test]
fn verbatim_offsets_point_into_the_original_text() {
    let annotations = [Annotation::new("v", "x = 1")];

    let (transcript, report) = align(markdown::events("Run `let x = 1;` now"), &annotations);

    let verbatim = EventRef::new(EventKind::Verbatim, 0);
    assert_eq!(report.located[0].start, EventPosition { event: verbatim, offset: 4 });
    assert_eq!(report.located[0].end, EventPosition { event: verbatim, offset: 8 });
    assert_eq!(transcript.markers(), vec!["+v", "-v"]);
}

#[test]
fn nearest_to_hint_policy_selects_the_later_occurrence() {
    let annotations = [Annotation::new("cat", "cat")
        .with_context("the cat")
        .with_context_offset(12)];

    let mut transcript = Transcript::default();
    Aligner::new()
        .with_policy(MatchPolicy::NearestToHint)
        .align(
            "doc",
            paragraph("the cat and the cat"),
            &annotations,
            &mut transcript,
        )
        .unwrap();

    assert_eq!(transcript.compact(), "< the cat and the [cat cat cat] >");
}

#[test]
fn markup_normalizer_matches_selections_made_over_raw_html() {
    let annotations = [Annotation::new("h", "bold move").with_context("a <b>bold</b> move")];

    let mut transcript = Transcript::default();
    let report = Aligner::new()
        .with_normalizer(crate::normalize::NormalizerChain::markup_and_whitespace())
        .align(
            "doc",
            markdown::events("a <b>bold</b> move"),
            &annotations,
            &mut transcript,
        )
        .unwrap();

    assert_eq!(report.unlocatable, vec![]);
    assert_well_nested(&transcript.markers());
}

#[test]
fn annotation_ending_on_an_empty_link_label_while_another_is_open() {
    let annotations = [
        Annotation::new("a", "See https"),
        Annotation::new("b", "com now"),
    ];

    let (transcript, report) = align(
        markdown::events("See [](https://example.com) now"),
        &annotations,
    );

    let label = EventRef::new(EventKind::LinkLabel, 0);
    assert_eq!(report.located[0].end, EventPosition { event: label, offset: 4 });
    assert_eq!(report.located[1].start, EventPosition { event: label, offset: 16 });
    assert_eq!(
        transcript.markers(),
        vec!["+a", "-a", "+a", "+b", "-b", "-a", "+b", "-b"]
    );
}

#[test]
fn list_item_boundary_closes_and_reopens_markers() {
    let annotations = [
        Annotation::new("X", "may not"),
        Annotation::new("Y", "robot may not injure"),
    ];

    let (transcript, report) = align(
        markdown::events("- robot may\n- not injure\n"),
        &annotations,
    );

    assert_eq!(report.located.len(), 2);
    assert_eq!(
        transcript.markers(),
        vec!["+Y", "+X", "-X", "-Y", "+Y", "+X", "-X", "-Y"]
    );
}

mod invariant_violations {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(seq: usize) -> EventRef {
        EventRef::new(EventKind::Word, seq)
    }

    fn replay(bookmarks: BookmarkTable) -> Result<(), OverlayError> {
        let annotations = [Annotation::new("a", "robot")];
        let mut transcript = Transcript::default();
        OverlayRenderer::new("doc", &annotations, bookmarks, &mut transcript)
            .replay(&paragraph("A robot"))
    }

    #[test]
    fn end_without_start_is_an_error() {
        let mut bookmarks = BookmarkTable::new();
        bookmarks.add(word(1), 4, AnnotationEvent::end(0));

        assert_eq!(
            replay(bookmarks),
            Err(OverlayError::UnopenedAnnotation {
                document: "doc".to_string(),
                annotation: AnnotationId::new("a"),
                event: word(1),
                offset: 4,
            })
        );
    }

    #[test]
    fn bookmark_on_a_missing_event_is_an_error() {
        let mut bookmarks = BookmarkTable::new();
        bookmarks.add(word(0), 0, AnnotationEvent::start(0));
        bookmarks.add(word(0), 0, AnnotationEvent::end(0));
        bookmarks.add(word(7), 0, AnnotationEvent::start(0));

        assert!(matches!(
            replay(bookmarks),
            Err(OverlayError::OrphanBookmark { event, .. }) if event == word(7)
        ));
    }

    #[test]
    fn report_from_a_longer_annotation_slice_is_rejected() {
        let aligner = Aligner::new();
        let stream = aligner.record(paragraph(FIRST_LAW));
        let annotations = [Annotation::new("a", "robot"), Annotation::new("b", "human")];
        let mut report = aligner.locate(&stream, &annotations);
        let mut transcript = Transcript::default();

        let result = aligner.replay(
            "doc",
            &stream,
            &annotations[..1],
            &mut report,
            &mut transcript,
        );

        assert_eq!(
            result,
            Err(OverlayError::UnknownAnnotation {
                document: "doc".to_string(),
                annotation: 1,
                available: 1,
                event: word(6),
                offset: 0,
            })
        );
        assert_eq!(transcript.emitted, vec![]);
    }

    #[test]
    fn start_without_end_is_an_error() {
        let mut bookmarks = BookmarkTable::new();
        bookmarks.add(word(1), 0, AnnotationEvent::start(0));

        assert_eq!(
            replay(bookmarks),
            Err(OverlayError::UnclosedAnnotations {
                document: "doc".to_string(),
                annotations: vec![AnnotationId::new("a")],
            })
        );
    }
}
