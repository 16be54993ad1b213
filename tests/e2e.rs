//! End-to-end tests against a real pdfium library.
//!
//! PDFs are generated in memory, so no fixtures are needed, but pdfium must
//! be loadable (`PDFIUM_LIB_PATH` or a system-wide libpdfium). The tests are
//! gated behind `E2E_ENABLED` so they do not run in CI unless requested.
//! The live model test additionally needs `GROQ_API_KEY`.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use futures::future::BoxFuture;
use pdf2context::pipeline::extract::{extract_document, page_marker};
use pdf2context::{
    convert_bytes, router, AppState, ChatCompletionsClient, ChatRequest, ContextConfig,
    Pdf2ContextError, VisionModel,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn pdfium_path() -> Option<PathBuf> {
    std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from)
}

/// Raw RGB image as `(width, height, pixel)`.
type TestImage = (u32, u32, [u8; 3]);

/// One page of a generated test PDF.
#[derive(Default)]
struct TestPage<'a> {
    text: &'a str,
    /// Images drawn directly on the page.
    images: &'a [TestImage],
    /// Images wrapped in a single form XObject drawn on the page.
    form_images: &'a [TestImage],
    /// Draw the first page image a second time.
    redraw_first_image: bool,
}

/// Build a minimal but well-formed PDF with Helvetica text and raw RGB images.
fn build_pdf(pages: &[TestPage<'_>]) -> Vec<u8> {
    // Object 1: catalog, 2: page tree, 3: font, then per page: page, contents, images.
    let mut objects: Vec<Vec<u8>> = vec![Vec::new(), Vec::new(), Vec::new()];
    objects[2] = b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec();

    let mut kids = Vec::new();
    for page in pages {
        let page_id = objects.len() + 1;
        let contents_id = page_id + 1;
        let first_image_id = page_id + 2;
        let form_id = first_image_id + page.images.len();
        let first_form_image_id = form_id + 1;

        let mut xobjects = String::new();
        let mut ops = String::new();
        if !page.text.is_empty() {
            ops.push_str(&format!("BT /F1 12 Tf 20 160 Td ({}) Tj ET\n", page.text));
        }
        for (i, (w, h, _)) in page.images.iter().enumerate() {
            xobjects.push_str(&format!("/Im{} {} 0 R ", i, first_image_id + i));
            ops.push_str(&draw_image(i, *w, *h, 20 + i * 40));
        }
        if page.redraw_first_image {
            if let Some((w, h, _)) = page.images.first() {
                ops.push_str(&draw_image(0, *w, *h, 150));
            }
        }
        if !page.form_images.is_empty() {
            xobjects.push_str(&format!("/Fm0 {} 0 R ", form_id));
            ops.push_str("q 1 0 0 1 100 0 cm /Fm0 Do Q\n");
        }

        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] \
                 /Resources << /Font << /F1 3 0 R >> /XObject << {} >> >> \
                 /Contents {} 0 R >>",
                xobjects, contents_id
            )
            .into_bytes(),
        );
        objects.push(stream_object("", ops.as_bytes()));
        for image in page.images {
            objects.push(image_object(image));
        }

        if !page.form_images.is_empty() {
            let mut form_xobjects = String::new();
            let mut form_ops = String::new();
            for (i, (w, h, _)) in page.form_images.iter().enumerate() {
                form_xobjects.push_str(&format!("/Im{} {} 0 R ", i, first_form_image_id + i));
                form_ops.push_str(&draw_image(i, *w, *h, 20 + i * 40));
            }
            let dict = format!(
                "/Type /XObject /Subtype /Form /BBox [0 0 100 200] \
                 /Resources << /XObject << {} >> >> ",
                form_xobjects
            );
            objects.push(stream_object(&dict, form_ops.as_bytes()));
            for image in page.form_images {
                objects.push(image_object(image));
            }
        }
        kids.push(format!("{} 0 R", page_id));
    }

    objects[0] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
    objects[1] = format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    )
    .into_bytes();

    let mut out = b"%PDF-1.7\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }
    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn draw_image(index: usize, w: u32, h: u32, y: usize) -> String {
    format!("q {} 0 0 {} 20 {} cm /Im{} Do Q\n", w, h, y, index)
}

fn image_object((w, h, px): &TestImage) -> Vec<u8> {
    let data: Vec<u8> = px.repeat((w * h) as usize);
    let dict = format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} \
         /ColorSpace /DeviceRGB /BitsPerComponent 8 ",
        w, h
    );
    stream_object(&dict, &data)
}

fn stream_object(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut obj = format!("<< {}/Length {} >>\nstream\n", dict_entries, data.len()).into_bytes();
    obj.extend_from_slice(data);
    obj.extend_from_slice(b"\nendstream");
    obj
}

/// Records every request it sees.
#[derive(Default)]
struct RecordingModel {
    seen: Mutex<Vec<ChatRequest>>,
}

impl VisionModel for RecordingModel {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, Pdf2ContextError>> {
        self.seen.lock().unwrap().push(request.clone());
        Box::pin(async { Ok("# Context\n\nReconstructed.\n".to_string()) })
    }
}

fn test_config() -> ContextConfig {
    let mut builder = ContextConfig::builder().api_key("test-key");
    if let Some(path) = pdfium_path() {
        builder = builder.pdfium_lib_path(path);
    }
    builder.build().expect("valid config")
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_markers_one_per_text_page_in_order() {
    e2e_skip_unless_ready!();

    let pdf = build_pdf(&[
        TestPage { text: "Alpha", ..Default::default() },
        TestPage { text: "Bravo", ..Default::default() },
        TestPage { text: "Charlie", ..Default::default() },
    ]);
    let doc = extract_document(pdf, pdfium_path().as_deref())
        .await
        .expect("extract should succeed");

    assert_eq!(doc.page_count, 3);
    assert_eq!(doc.text.matches("--- PAGE ").count(), 3);
    let positions: Vec<usize> = (1..=3)
        .map(|n| doc.text.find(&page_marker(n)).expect("marker present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(doc.text.contains("Alpha") && doc.text.contains("Charlie"));
    assert!(doc.images.is_empty());
}

#[tokio::test]
async fn test_blank_page_has_no_marker() {
    e2e_skip_unless_ready!();

    let pdf = build_pdf(&[
        TestPage { text: "First", ..Default::default() },
        TestPage { text: "", ..Default::default() },
        TestPage { text: "Third", ..Default::default() },
    ]);
    let doc = extract_document(pdf, pdfium_path().as_deref())
        .await
        .expect("extract should succeed");

    assert!(doc.text.contains(&page_marker(1)));
    assert!(!doc.text.contains(&page_marker(2)));
    assert!(doc.text.contains(&page_marker(3)));
}

#[tokio::test]
async fn test_images_collected_in_page_order() {
    e2e_skip_unless_ready!();

    let pdf = build_pdf(&[
        TestPage {
            text: "Figures",
            images: &[(4, 3, [255, 0, 0]), (6, 2, [0, 255, 0])],
            ..Default::default()
        },
        TestPage {
            text: "More",
            images: &[(5, 5, [0, 0, 255])],
            ..Default::default()
        },
    ]);
    let doc = extract_document(pdf, pdfium_path().as_deref())
        .await
        .expect("extract should succeed");

    let dims: Vec<(u32, u32)> = doc.images.iter().map(|i| (i.width(), i.height())).collect();
    assert_eq!(dims, vec![(4, 3), (6, 2), (5, 5)]);

    let stacked = pdf2context::stack_vertically(&doc.images).expect("composite");
    assert_eq!(stacked.dimensions(), (6, 10));
}

#[tokio::test]
async fn test_images_inside_form_xobjects_are_collected() {
    e2e_skip_unless_ready!();

    let pdf = build_pdf(&[TestPage {
        text: "Figure 1",
        images: &[(4, 4, [10, 20, 30])],
        form_images: &[(7, 3, [40, 50, 60])],
        ..Default::default()
    }]);
    let doc = extract_document(pdf, pdfium_path().as_deref())
        .await
        .expect("extract should succeed");

    let dims: Vec<(u32, u32)> = doc.images.iter().map(|i| (i.width(), i.height())).collect();
    assert_eq!(dims, vec![(4, 4), (7, 3)]);
}

#[tokio::test]
async fn test_image_drawn_twice_is_collected_once() {
    e2e_skip_unless_ready!();

    let pdf = build_pdf(&[
        TestPage {
            text: "Letterhead",
            images: &[(8, 2, [0, 0, 0])],
            redraw_first_image: true,
            ..Default::default()
        },
        TestPage {
            text: "Letterhead again",
            images: &[(8, 2, [0, 0, 0])],
            ..Default::default()
        },
    ]);
    let doc = extract_document(pdf, pdfium_path().as_deref())
        .await
        .expect("extract should succeed");

    // Once per page, as with any other image resource.
    assert_eq!(doc.images.len(), 2);
}

#[tokio::test]
async fn test_garbage_after_header_is_corrupt() {
    e2e_skip_unless_ready!();

    let err = extract_document(b"%PDF-1.7\nthis is not a pdf".to_vec(), pdfium_path().as_deref())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Pdf2ContextError::CorruptPdf { .. }),
        "got {err:?}"
    );
}

// ── Analysis ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_text_only_pdf_sends_no_image() {
    e2e_skip_unless_ready!();

    let model = RecordingModel::default();
    let pdf = build_pdf(&[TestPage { text: "Only words", ..Default::default() }]);
    convert_bytes(&model, &test_config(), pdf)
        .await
        .expect("convert should succeed");

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].image_count(), 0);
}

#[tokio::test]
async fn test_pdf_with_images_sends_one_composite() {
    e2e_skip_unless_ready!();

    let model = RecordingModel::default();
    let pdf = build_pdf(&[
        TestPage { text: "A", images: &[(3, 3, [1, 2, 3])], ..Default::default() },
        TestPage { text: "B", images: &[(3, 3, [4, 5, 6])], ..Default::default() },
    ]);
    convert_bytes(&model, &test_config(), pdf)
        .await
        .expect("convert should succeed");

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen[0].image_count(), 1);
}

// ── HTTP round trip ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_returns_markdown_attachment() {
    e2e_skip_unless_ready!();

    let state = Arc::new(AppState {
        config: test_config(),
        model: Arc::new(RecordingModel::default()),
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router(state)).await.unwrap() });

    let pdf = build_pdf(&[TestPage { text: "Hello", ..Default::default() }]);
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(pdf).file_name("hello.pdf"),
    );
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=context.md"
    );
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/markdown"));
    assert_eq!(resp.text().await.unwrap(), "# Context\n\nReconstructed.\n");
}

// ── Live model ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_model_reconstruction() {
    e2e_skip_unless_ready!();
    let Ok(api_key) = std::env::var("GROQ_API_KEY") else {
        println!("SKIP: set GROQ_API_KEY to call the live model");
        return;
    };

    let mut builder = ContextConfig::builder().api_key(api_key);
    if let Some(path) = pdfium_path() {
        builder = builder.pdfium_lib_path(path);
    }
    let config = builder.build().unwrap();
    let client = ChatCompletionsClient::new(&config).unwrap();

    let pdf = build_pdf(&[
        TestPage {
            text: "Quarterly revenue rose 12 percent to 4.2 million",
            images: &[(32, 16, [200, 30, 30])],
            ..Default::default()
        },
    ]);
    let markdown = convert_bytes(&client, &config, pdf)
        .await
        .expect("live conversion should succeed");

    assert!(!markdown.trim().is_empty());
    println!("{markdown}");
}
