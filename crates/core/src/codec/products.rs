//! Product table codec.
//!
//! The table is a CSV file with the header
//! `id,name,category,price,stock,image_path,description`. Decoding is
//! best-effort: columns are matched by header name, missing cells read as
//! empty, numeric cells that do not parse become zero, and bytes that are
//! not valid UTF-8 are replaced rather than dropping the row. Every data row
//! yields a product; only input that cannot be read as CSV at all fails the
//! decode.

use std::borrow::Cow;

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::CodecError;
use crate::types::{Price, Product, ProductId};

/// Column order of the product table.
pub const PRODUCT_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "category",
    "price",
    "stock",
    "image_path",
    "description",
];

/// Position of each known column in the file's header.
struct ColumnIndex {
    id: Option<usize>,
    name: Option<usize>,
    category: Option<usize>,
    price: Option<usize>,
    stock: Option<usize>,
    image_path: Option<usize>,
    description: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &ByteRecord) -> Self {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == column)
        };
        Self {
            id: find("id"),
            name: find("name"),
            category: find("category"),
            price: find("price"),
            stock: find("stock"),
            image_path: find("image_path"),
            description: find("description"),
        }
    }
}

fn cell(record: &ByteRecord, index: Option<usize>) -> Cow<'_, str> {
    index
        .and_then(|i| record.get(i))
        .map_or(Cow::Borrowed(""), String::from_utf8_lossy)
}

/// Parse an integer cell, accepting float spellings such as `"5.0"`.
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<Decimal>()
            .ok()
            .and_then(|d| d.trunc().to_i64())
    })
}

fn parse_stock(raw: &str) -> u32 {
    parse_integer(raw)
        .and_then(|n| u32::try_from(n.max(0)).ok())
        .unwrap_or(0)
}

fn parse_id(raw: &str) -> ProductId {
    ProductId::new(
        parse_integer(raw)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
    )
}

fn decode_row(record: &ByteRecord, columns: &ColumnIndex) -> Product {
    let image_path = cell(record, columns.image_path);
    let image_path = image_path.trim();
    Product {
        id: parse_id(&cell(record, columns.id)),
        name: cell(record, columns.name).into_owned(),
        category: cell(record, columns.category).into_owned(),
        price: Price::parse_lenient(&cell(record, columns.price)),
        stock: parse_stock(&cell(record, columns.stock)),
        image_path: (!image_path.is_empty()).then(|| image_path.to_string()),
        description: cell(record, columns.description).into_owned(),
    }
}

/// Decode the product table.
///
/// # Errors
///
/// Returns `CodecError::Csv` if the reader fails. Rows are never skipped, so
/// a save after a successful decode cannot lose a product.
pub fn decode_products(bytes: &[u8]) -> Result<Vec<Product>, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns = ColumnIndex::from_headers(reader.byte_headers()?);

    reader
        .byte_records()
        .map(|record| -> Result<Product, CodecError> { Ok(decode_row(&record?, &columns)) })
        .collect()
}

/// Encode the product table, header first, one row per product in order.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn encode_products(products: &[Product]) -> Result<Vec<u8>, CodecError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(PRODUCT_COLUMNS)?;

    for product in products {
        writer.write_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            product.price.to_record_string(),
            product.stock.to_string(),
            product.image_path.clone().unwrap_or_default(),
            product.description.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| CodecError::Flush(e.error().to_string()))
}
