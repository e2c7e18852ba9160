// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use marginalia_engine::Annotation;

const SENTENCES: [&str; 4] = [
    "A robot may not injure a human being or, through inaction, allow a human being to come to harm.",
    "A robot must obey the orders given it by human beings except where such orders would conflict with the *First Law*.",
    "A robot must protect its own existence as long as such protection does not conflict with the `First` or **Second Law**.",
    "See [the handbook](https://example.com/handbook) and [](https://example.com/appendix) for details.",
];

#[allow(dead_code)]
pub fn generate_document(sections: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("## Section {section}\n\n"));
        for sentence in SENTENCES {
            content.push_str(sentence);
            content.push_str("\n\n");
        }
        content.push_str("- first item\n- second item\n\n");
    }
    content
}

/// One annotation per sentence of every section, overlapping its neighbour
#[allow(dead_code)]
pub fn generate_annotations(sections: usize) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    for section in 0..sections {
        let heading = format!("Section {section}");
        annotations.push(
            Annotation::new(format!("h{section}"), heading.clone())
                .with_context(format!("{heading} A robot may not")),
        );
        annotations.push(
            Annotation::new(format!("o{section}"), "obey the orders")
                .with_context("A robot must obey the orders given it")
                .with_context_offset(section * 400),
        );
        annotations.push(
            Annotation::new(format!("c{section}"), "conflict with the First Law")
                .with_context("would conflict with the First Law."),
        );
    }
    annotations
}
