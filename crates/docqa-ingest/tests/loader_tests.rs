use docqa_core::error::Error;
use docqa_core::types::Upload;
use docqa_ingest::load_documents;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids: Vec<Object> = Vec::new();
    for text in texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn text_and_markdown_become_single_unpaged_documents() {
    let uploads = vec![
        Upload::new("notes.txt", "The sky is blue."),
        Upload::new("README.MD", "# Title\n\nBody"),
    ];
    let outcome = load_documents(&uploads).expect("load");
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.documents[0].text, "The sky is blue.");
    assert_eq!(outcome.documents[0].metadata.source, "notes.txt");
    assert_eq!(outcome.documents[0].metadata.page, None);
    assert_eq!(outcome.documents[1].metadata.source, "README.MD");
}

#[test]
fn unsupported_files_are_skipped_without_aborting() {
    let uploads = vec![
        Upload::new("deck.pptx", vec![1u8, 2, 3]),
        Upload::new("a.txt", "alpha"),
        Upload::new("data.csv", "x,y"),
    ];
    let outcome = load_documents(&uploads).expect("load");
    assert_eq!(outcome.skipped, vec!["deck.pptx".to_string(), "data.csv".to_string()]);
    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.documents[0].metadata.source, "a.txt");
}

#[test]
fn invalid_utf8_aborts_the_batch() {
    let uploads = vec![Upload::new("ok.txt", "fine"), Upload::new("bad.txt", vec![0xff, 0xfe, 0x00])];
    match load_documents(&uploads) {
        Err(Error::Decode { file, .. }) => assert_eq!(file, "bad.txt"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn pdf_yields_one_document_per_page() {
    let bytes = pdf_with_pages(&["Alpha first page", "Bravo second page"]);
    let outcome = load_documents(&[Upload::new("guide.pdf", bytes)]).expect("load");
    assert_eq!(outcome.documents.len(), 2);
    for (i, doc) in outcome.documents.iter().enumerate() {
        assert_eq!(doc.metadata.source, "guide.pdf");
        assert_eq!(doc.metadata.page, Some(i));
    }
    assert!(outcome.documents[0].text.contains("Alpha"), "page 0: {:?}", outcome.documents[0].text);
    assert!(outcome.documents[1].text.contains("Bravo"), "page 1: {:?}", outcome.documents[1].text);
}

#[test]
fn corrupt_pdf_is_an_extraction_error() {
    let uploads = vec![Upload::new("broken.pdf", b"this is not a pdf".to_vec())];
    match load_documents(&uploads) {
        Err(Error::Extraction { file, .. }) => assert_eq!(file, "broken.pdf"),
        other => panic!("expected extraction error, got {other:?}"),
    }
}
