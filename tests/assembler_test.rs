// PDF組立のテスト: ページ順序、MediaBox、XObject辞書、入力検証
//
// All fixture pages are generated in-process; the assembled bytes are
// verified by loading them back with lopdf.

use lopdf::{Document, Object, Stream};

use pdf_mono::mono::{Bitmap, Codec, EncodedPage, g4, jpeg};
use pdf_mono::pdf::{DocumentAssembler, assemble};

// ============================================================
// Helpers
// ============================================================

/// Bitonal page with a black left half, encoded as G4.
fn g4_page(width: u32, height: u32, dpi: u32) -> (Bitmap, EncodedPage) {
    let mut bitmap = Bitmap::new(width, height);
    for y in 0..height {
        for x in (width / 2)..width {
            bitmap.set_white(x, y);
        }
    }
    let data = g4::encode(&bitmap);
    let page = EncodedPage {
        data,
        width,
        height,
        codec: Codec::G4,
        dpi,
    };
    (bitmap, page)
}

/// Grayscale gradient page encoded as JPEG.
fn jpeg_page(width: u32, height: u32, dpi: u32) -> EncodedPage {
    let gray = image::GrayImage::from_fn(width, height, |x, _| image::Luma([(x % 256) as u8]));
    let data = jpeg::encode_gray_to_jpeg(&gray, 90).expect("encode JPEG");
    EncodedPage {
        data,
        width,
        height,
        codec: Codec::Jpeg,
        dpi,
    }
}

fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("assembled PDF should be loadable")
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> &'a lopdf::Dictionary {
    match obj {
        Object::Reference(r) => doc.get_dictionary(*r).expect("resolve dictionary reference"),
        Object::Dictionary(d) => d,
        other => panic!("expected dictionary, got {other:?}"),
    }
}

/// Follow Resources -> XObject -> Im0 to the image stream of a page.
fn page_image_stream<'a>(doc: &'a Document, page_id: lopdf::ObjectId) -> &'a Stream {
    let page_dict = doc.get_dictionary(page_id).expect("page dictionary");
    let resources = resolve_dict(doc, page_dict.get(b"Resources").expect("Resources"));
    let xobject = resolve_dict(doc, resources.get(b"XObject").expect("XObject"));
    let image_id = match xobject.get(b"Im0").expect("Im0 entry") {
        Object::Reference(r) => *r,
        other => panic!("Im0 should be a reference, got {other:?}"),
    };
    match doc.get_object(image_id).expect("image object") {
        Object::Stream(s) => s,
        other => panic!("Im0 should be a stream, got {other:?}"),
    }
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(f) => *f,
        other => panic!("expected number, got {other:?}"),
    }
}

fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> Vec<f32> {
    let page_dict = doc.get_dictionary(page_id).expect("page dictionary");
    match page_dict.get(b"MediaBox").expect("MediaBox") {
        Object::Array(values) => values.iter().map(number).collect(),
        other => panic!("MediaBox should be an array, got {other:?}"),
    }
}

// ============================================================
// 1. 空の組立は失敗する
// ============================================================

#[test]
fn test_finish_without_pages_fails() {
    let assembler = DocumentAssembler::new();
    let err = assembler.finish().expect_err("empty assembly must fail");
    assert!(err.to_string().contains("no pages"), "got: {err}");
}

#[test]
fn test_assemble_empty_slice_fails() {
    assert!(assemble(&[]).is_err());
}

// ============================================================
// 2. ページ数と順序
// ============================================================

#[test]
fn test_pages_keep_append_order() {
    let pages: Vec<EncodedPage> = [10u32, 20, 30]
        .iter()
        .map(|&w| g4_page(w, 8, 72).1)
        .collect();
    let bytes = assemble(&pages).expect("assemble");

    let doc = load(&bytes);
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), 3);

    // get_pages returns pages in document order; widths identify them
    let widths: Vec<i64> = page_ids
        .iter()
        .map(|&id| {
            page_image_stream(&doc, id)
                .dict
                .get(b"Width")
                .expect("Width")
                .as_i64()
                .expect("integer width")
        })
        .collect();
    assert_eq!(widths, vec![10, 20, 30]);
}

// ============================================================
// 3. MediaBoxの物理サイズ計算
// ============================================================

#[test]
fn test_media_box_from_pixels_and_dpi() {
    // 144px @ 72dpi = 144pt, 300px @ 300dpi = 72pt
    let (_, page_a) = g4_page(144, 144, 72);
    let (_, page_b) = g4_page(300, 600, 300);
    let bytes = assemble(&[page_a, page_b]).expect("assemble");

    let doc = load(&bytes);
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();

    let box_a = media_box(&doc, page_ids[0]);
    assert!((box_a[2] - 144.0).abs() < 0.1, "got {box_a:?}");
    assert!((box_a[3] - 144.0).abs() < 0.1, "got {box_a:?}");

    let box_b = media_box(&doc, page_ids[1]);
    assert!((box_b[2] - 72.0).abs() < 0.1, "got {box_b:?}");
    assert!((box_b[3] - 144.0).abs() < 0.1, "got {box_b:?}");
}

// ============================================================
// 4. G4ページのXObject辞書とストリーム
// ============================================================

#[test]
fn test_g4_page_dictionary_and_stream() {
    let (bitmap, page) = g4_page(64, 40, 300);
    let encoded = page.data.clone();
    let bytes = assemble(std::slice::from_ref(&page)).expect("assemble");

    let doc = load(&bytes);
    let page_id = *doc.get_pages().values().next().expect("one page");
    let stream = page_image_stream(&doc, page_id);

    let dict = &stream.dict;
    assert_eq!(dict.get(b"Filter").expect("Filter").as_name().expect("name"), b"CCITTFaxDecode");
    assert_eq!(dict.get(b"BitsPerComponent").expect("bpc").as_i64().expect("int"), 1);
    assert_eq!(
        dict.get(b"ColorSpace").expect("cs").as_name().expect("name"),
        b"DeviceGray"
    );

    let parms = resolve_dict(&doc, dict.get(b"DecodeParms").expect("DecodeParms"));
    assert_eq!(parms.get(b"K").expect("K").as_i64().expect("int"), -1);
    assert_eq!(parms.get(b"Columns").expect("Columns").as_i64().expect("int"), 64);
    assert_eq!(parms.get(b"Rows").expect("Rows").as_i64().expect("int"), 40);

    // The embedded stream is the G4 data verbatim and decodes back to the
    // exact source bitmap.
    assert_eq!(stream.content, encoded);
    let decoded = g4::decode(&stream.content, 64, 40).expect("decode G4 stream");
    assert_eq!(decoded, bitmap);
}

// ============================================================
// 5. JPEGページのXObject辞書とストリーム
// ============================================================

#[test]
fn test_jpeg_page_dictionary_and_stream() {
    let page = jpeg_page(80, 60, 150);
    let encoded = page.data.clone();
    let bytes = assemble(std::slice::from_ref(&page)).expect("assemble");

    let doc = load(&bytes);
    let page_id = *doc.get_pages().values().next().expect("one page");
    let stream = page_image_stream(&doc, page_id);

    let dict = &stream.dict;
    assert_eq!(dict.get(b"Filter").expect("Filter").as_name().expect("name"), b"DCTDecode");
    assert_eq!(dict.get(b"BitsPerComponent").expect("bpc").as_i64().expect("int"), 8);
    assert_eq!(
        dict.get(b"ColorSpace").expect("cs").as_name().expect("name"),
        b"DeviceGray"
    );
    assert_eq!(dict.get(b"Width").expect("Width").as_i64().expect("int"), 80);
    assert_eq!(dict.get(b"Height").expect("Height").as_i64().expect("int"), 60);

    assert_eq!(stream.content, encoded);
}

// ============================================================
// 6. 不正なページストリームの拒否
// ============================================================

#[test]
fn test_rejects_jpeg_without_soi_marker() {
    let page = EncodedPage {
        data: vec![0x00, 0x01, 0x02, 0x03],
        width: 10,
        height: 10,
        codec: Codec::Jpeg,
        dpi: 300,
    };
    let mut assembler = DocumentAssembler::new();
    assert!(assembler.append_page(&page).is_err());
}

#[test]
fn test_rejects_empty_g4_stream() {
    let page = EncodedPage {
        data: Vec::new(),
        width: 10,
        height: 10,
        codec: Codec::G4,
        dpi: 300,
    };
    let mut assembler = DocumentAssembler::new();
    assert!(assembler.append_page(&page).is_err());
}

#[test]
fn test_rejects_zero_dimension_or_dpi() {
    let (_, template) = g4_page(8, 8, 300);

    let zero_width = EncodedPage {
        data: template.data.clone(),
        width: 0,
        height: template.height,
        codec: Codec::G4,
        dpi: 300,
    };
    let mut assembler = DocumentAssembler::new();
    assert!(assembler.append_page(&zero_width).is_err());

    let zero_dpi = EncodedPage { dpi: 0, ..template };
    let mut assembler = DocumentAssembler::new();
    assert!(assembler.append_page(&zero_dpi).is_err());
}

// ============================================================
// 7. 逐次追加とassembleの等価性
// ============================================================

#[test]
fn test_incremental_append_matches_batch_assemble() {
    let pages: Vec<EncodedPage> = (0..2).map(|_| g4_page(32, 32, 300).1).collect();

    let mut assembler = DocumentAssembler::new();
    for page in &pages {
        assembler.append_page(page).expect("append");
    }
    assert_eq!(assembler.page_count(), 2);
    let incremental = assembler.finish().expect("finish");

    let doc = load(&incremental);
    assert_eq!(doc.get_pages().len(), 2);
}
