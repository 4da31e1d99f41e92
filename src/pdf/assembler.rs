// エンコード済みページからのXObject構築、コンテンツストリーム組立、単一PDF出力

use lopdf::{Document, Object, Stream, dictionary};

use crate::error::PdfMonoError;
use crate::mono::{Codec, EncodedPage};

/// エンコード済みページ列を1つのPDF文書に組み立てる。
///
/// ページは追加された順序で出力される。物理サイズはピクセル寸法と
/// DPIから計算する（1ポイント = 1/72インチ）。
pub struct DocumentAssembler {
    doc: Document,
    pages_id: lopdf::ObjectId,
    kids: Vec<Object>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// G4 XObjectを追加する。
    ///
    /// 戻り値はXObjectのオブジェクトID。
    fn add_g4_xobject(&mut self, data: &[u8], width: u32, height: u32) -> lopdf::ObjectId {
        let decode_parms = dictionary! {
            "K" => -1,
            "Columns" => width as i64,
            "Rows" => height as i64,
            "BlackIs1" => false,
            "EndOfBlock" => false,
        };
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 1,
            "Filter" => "CCITTFaxDecode",
            "DecodeParms" => Object::Dictionary(decode_parms),
        };
        let stream = Stream::new(dict, data.to_vec());
        self.doc.add_object(Object::Stream(stream))
    }

    /// グレースケールJPEG XObjectを追加する。
    ///
    /// 戻り値はXObjectのオブジェクトID。
    fn add_jpeg_xobject(&mut self, data: &[u8], width: u32, height: u32) -> lopdf::ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        let stream = Stream::new(dict, data.to_vec());
        self.doc.add_object(Object::Stream(stream))
    }

    /// ページ描画用のコンテンツストリームバイト列を生成する。
    ///
    /// `q <w_pts> 0 0 <h_pts> 0 0 cm /Im0 Do Q`
    fn build_content_stream(width_pts: f32, height_pts: f32) -> Vec<u8> {
        format!("q {width_pts:.2} 0 0 {height_pts:.2} 0 0 cm /Im0 Do Q").into_bytes()
    }

    /// エンコード済みページを文書末尾に追加する。
    pub fn append_page(&mut self, page: &EncodedPage) -> crate::error::Result<()> {
        validate_page(page)?;

        let image_id = match page.codec {
            Codec::G4 => self.add_g4_xobject(&page.data, page.width, page.height),
            Codec::Jpeg => self.add_jpeg_xobject(&page.data, page.width, page.height),
        };

        // ピクセル寸法とDPIから物理サイズ（ポイント）を計算
        let width_pts = page.width as f32 * 72.0 / page.dpi as f32;
        let height_pts = page.height as f32 * 72.0 / page.dpi as f32;

        let mut xobject_dict = lopdf::Dictionary::new();
        xobject_dict.set("Im0", Object::Reference(image_id));
        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => Object::Dictionary(xobject_dict),
        });

        let content_bytes = Self::build_content_stream(width_pts, height_pts);
        let content_stream = Stream::new(dictionary! {}, content_bytes);
        let content_id = self.doc.add_object(Object::Stream(content_stream));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pts),
                Object::Real(height_pts),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());

        Ok(())
    }

    /// PDFドキュメントをバイト列として出力する。
    ///
    /// ページが1つも追加されていない場合はエラーを返す。
    pub fn finish(mut self) -> crate::error::Result<Vec<u8>> {
        if self.kids.is_empty() {
            return Err(PdfMonoError::assembly("no pages to assemble"));
        }

        let count = self.kids.len() as i64;
        let kids = std::mem::take(&mut self.kids);
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| PdfMonoError::assembly(e.to_string()))?;
        Ok(buf)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// ページ列を1回の呼び出しでPDFバイト列に組み立てる。
pub fn assemble(pages: &[EncodedPage]) -> crate::error::Result<Vec<u8>> {
    let mut assembler = DocumentAssembler::new();
    for page in pages {
        assembler.append_page(page)?;
    }
    assembler.finish()
}

fn validate_page(page: &EncodedPage) -> crate::error::Result<()> {
    if page.width == 0 || page.height == 0 {
        return Err(PdfMonoError::assembly(format!(
            "page has zero dimension ({}x{})",
            page.width, page.height
        )));
    }
    if page.dpi == 0 {
        return Err(PdfMonoError::assembly("page dpi must be positive"));
    }
    match page.codec {
        Codec::G4 => {
            if page.data.is_empty() {
                return Err(PdfMonoError::assembly("empty G4 page stream"));
            }
        }
        Codec::Jpeg => {
            if page.data.len() < 2 || page.data[0..2] != [0xFF, 0xD8] {
                return Err(PdfMonoError::assembly(
                    "malformed JPEG page stream (missing SOI marker)",
                ));
            }
        }
    }
    Ok(())
}
