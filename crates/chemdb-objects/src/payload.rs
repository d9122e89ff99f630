//! Property payload kinds and their document encodings.
//!
//! Each payload implements [`PropertyPayload`]: a type tag plus an
//! encode/decode pair over the generic document. The CRUD engine in
//! [`crate::property`] is written once against this trait; adding a new
//! payload kind means adding one implementation here.

use serde_json::Value;

use chemdb_store::Document;
use chemdb_types::{DbError, DbResult};

/// Document field holding the property-kind tag.
pub const PROPERTY_TYPE_FIELD: &str = "_propertytype";

/// One payload kind of the generic property engine.
///
/// `decode` may assume the type tag was already verified; a document
/// whose payload fields are absent or of the wrong shape fails with
/// `MissingIdOrField`.
pub trait PropertyPayload: Sized {
    /// The `_propertytype` tag stored alongside the payload.
    const PROPERTY_TYPE: &'static str;

    /// Write the payload fields into the document.
    fn encode_into(&self, document: &mut Document);

    /// Reconstruct the payload from its stored fields, exactly.
    fn decode(document: &Document) -> DbResult<Self>;
}

impl PropertyPayload for bool {
    const PROPERTY_TYPE: &'static str = "bool_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("data", Value::Bool(*self));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        document.get_bool("data").ok_or(DbError::MissingIdOrField)
    }
}

impl PropertyPayload for f64 {
    const PROPERTY_TYPE: &'static str = "number_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("data", Value::from(*self));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        document.get_f64("data").ok_or(DbError::MissingIdOrField)
    }
}

impl PropertyPayload for String {
    const PROPERTY_TYPE: &'static str = "string_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("data", Value::String(self.clone()));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        document
            .get_str("data")
            .map(str::to_string)
            .ok_or(DbError::MissingIdOrField)
    }
}

fn encode_f64_slice(data: &[f64]) -> Value {
    Value::Array(data.iter().map(|x| Value::from(*x)).collect())
}

fn decode_f64_array(value: Option<&Value>) -> DbResult<Vec<f64>> {
    let values = value
        .and_then(Value::as_array)
        .ok_or(DbError::MissingIdOrField)?;
    values
        .iter()
        .map(|v| v.as_f64().ok_or(DbError::MissingIdOrField))
        .collect()
}

/// Stored dimensions come from documents other writers control; a
/// negative value is as malformed as a missing one.
fn decode_dim(document: &Document, key: &str) -> DbResult<usize> {
    let raw = document.get_i64(key).ok_or(DbError::MissingIdOrField)?;
    usize::try_from(raw).map_err(|_| DbError::MissingIdOrField)
}

fn decode_usize_array(value: Option<&Value>) -> DbResult<Vec<usize>> {
    let values = value
        .and_then(Value::as_array)
        .ok_or(DbError::MissingIdOrField)?;
    values
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|x| x as usize)
                .ok_or(DbError::MissingIdOrField)
        })
        .collect()
}

impl PropertyPayload for Vec<f64> {
    const PROPERTY_TYPE: &'static str = "vector_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("size", Value::from(self.len() as i64));
        document.insert("data", encode_f64_slice(self));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        let size = decode_dim(document, "size")?;
        let data = decode_f64_array(document.get("data"))?;
        if data.len() != size {
            return Err(DbError::MissingIdOrField);
        }
        Ok(data)
    }
}

/// Dense row-major matrix with explicit dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Build from row-major data. Fails with `Field` when the dimensions
    /// are inconsistent with the element count.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> DbResult<Self> {
        let expected = rows.checked_mul(cols).ok_or(DbError::Field)?;
        if expected != data.len() {
            return Err(DbError::Field);
        }
        Ok(Self { rows, cols, data })
    }

    /// An all-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major element access.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Set one element. Out-of-range indices fail with `Field`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> DbResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(DbError::Field);
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// The row-major backing slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

impl PropertyPayload for DenseMatrix {
    const PROPERTY_TYPE: &'static str = "dense_matrix_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("rows", Value::from(self.rows as i64));
        document.insert("cols", Value::from(self.cols as i64));
        document.insert("data", encode_f64_slice(&self.data));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        let rows = decode_dim(document, "rows")?;
        let cols = decode_dim(document, "cols")?;
        let data = decode_f64_array(document.get("data"))?;
        Self::new(rows, cols, data)
    }
}

/// Sparse matrix in triplet form with explicit dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    row_indices: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Build from (row, col, value) triplets. Out-of-range indices fail
    /// with `Field`. Triplet order is preserved exactly.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> DbResult<Self> {
        let mut matrix = Self {
            rows,
            cols,
            row_indices: Vec::new(),
            col_indices: Vec::new(),
            values: Vec::new(),
        };
        for (row, col, value) in triplets {
            if row >= rows || col >= cols {
                return Err(DbError::Field);
            }
            matrix.row_indices.push(row);
            matrix.col_indices.push(col);
            matrix.values.push(value);
        }
        Ok(matrix)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate stored entries in insertion order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.row_indices
            .iter()
            .zip(&self.col_indices)
            .zip(&self.values)
            .map(|((r, c), v)| (*r, *c, *v))
    }

    fn from_parts(
        rows: usize,
        cols: usize,
        row_indices: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> DbResult<Self> {
        if row_indices.len() != values.len() || col_indices.len() != values.len() {
            return Err(DbError::MissingIdOrField);
        }
        if row_indices.iter().any(|r| *r >= rows) || col_indices.iter().any(|c| *c >= cols) {
            return Err(DbError::Field);
        }
        Ok(Self {
            rows,
            cols,
            row_indices,
            col_indices,
            values,
        })
    }
}

impl PropertyPayload for SparseMatrix {
    const PROPERTY_TYPE: &'static str = "sparse_matrix_property";

    fn encode_into(&self, document: &mut Document) {
        document.insert("rows", Value::from(self.rows as i64));
        document.insert("cols", Value::from(self.cols as i64));
        document.insert(
            "row_indices",
            Value::Array(self.row_indices.iter().map(|i| Value::from(*i as i64)).collect()),
        );
        document.insert(
            "col_indices",
            Value::Array(self.col_indices.iter().map(|i| Value::from(*i as i64)).collect()),
        );
        document.insert("values", encode_f64_slice(&self.values));
    }

    fn decode(document: &Document) -> DbResult<Self> {
        let rows = decode_dim(document, "rows")?;
        let cols = decode_dim(document, "cols")?;
        let row_indices = decode_usize_array(document.get("row_indices"))?;
        let col_indices = decode_usize_array(document.get("col_indices"))?;
        let values = decode_f64_array(document.get("values"))?;
        Self::from_parts(rows, cols, row_indices, col_indices, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<P: PropertyPayload + PartialEq + std::fmt::Debug>(payload: P) {
        let mut doc = Document::new();
        payload.encode_into(&mut doc);
        assert_eq!(P::decode(&doc).unwrap(), payload);
    }

    #[test]
    fn scalar_payloads_roundtrip() {
        roundtrip(true);
        roundtrip(false);
        roundtrip(0.0_f64);
        roundtrip(-13.25_f64);
        roundtrip("electronic_energy".to_string());
        roundtrip(String::new());
    }

    #[test]
    fn vector_roundtrip() {
        roundtrip(vec![1.0, 0.0, -2.5, 1e-8]);
        roundtrip(Vec::<f64>::new());
    }

    #[test]
    fn vector_size_mismatch_fails() {
        let mut doc = Document::new();
        vec![1.0, 2.0].encode_into(&mut doc);
        doc.insert("size", Value::from(3));
        assert_eq!(Vec::<f64>::decode(&doc), Err(DbError::MissingIdOrField));
    }

    #[test]
    fn decode_without_payload_fields_fails() {
        let doc = Document::new();
        assert_eq!(bool::decode(&doc), Err(DbError::MissingIdOrField));
        assert_eq!(f64::decode(&doc), Err(DbError::MissingIdOrField));
        assert_eq!(DenseMatrix::decode(&doc), Err(DbError::MissingIdOrField));
    }

    #[test]
    fn dense_matrix_validates_dimensions() {
        assert!(DenseMatrix::new(2, 3, vec![0.0; 6]).is_ok());
        assert_eq!(
            DenseMatrix::new(2, 3, vec![0.0; 5]).unwrap_err(),
            DbError::Field
        );
    }

    #[test]
    fn dense_matrix_decode_rejects_overflowing_dims() {
        // A foreign writer can store any dimensions it likes; decode
        // must answer with an error, not an arithmetic panic.
        let mut doc = Document::new();
        doc.insert("rows", Value::from(i64::MAX));
        doc.insert("cols", Value::from(i64::MAX));
        doc.insert("data", encode_f64_slice(&[]));
        assert_eq!(DenseMatrix::decode(&doc), Err(DbError::Field));
    }

    #[test]
    fn dense_matrix_decode_rejects_negative_dims() {
        let mut doc = Document::new();
        doc.insert("rows", Value::from(-1_i64));
        doc.insert("cols", Value::from(2_i64));
        doc.insert("data", encode_f64_slice(&[0.0, 0.0]));
        assert_eq!(DenseMatrix::decode(&doc), Err(DbError::MissingIdOrField));
    }

    #[test]
    fn sparse_matrix_decode_rejects_negative_dims() {
        let mut doc = Document::new();
        SparseMatrix::from_triplets(2, 2, [(0, 0, 1.0)])
            .unwrap()
            .encode_into(&mut doc);
        doc.insert("rows", Value::from(-3_i64));
        assert_eq!(SparseMatrix::decode(&doc), Err(DbError::MissingIdOrField));
    }

    #[test]
    fn vector_decode_rejects_negative_size() {
        let mut doc = Document::new();
        vec![1.0].encode_into(&mut doc);
        doc.insert("size", Value::from(-1_i64));
        assert_eq!(Vec::<f64>::decode(&doc), Err(DbError::MissingIdOrField));
    }

    #[test]
    fn dense_matrix_is_row_major() {
        let m = DenseMatrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(0, 2), Some(3.0));
        assert_eq!(m.get(1, 0), Some(4.0));
        assert_eq!(m.get(1, 2), Some(6.0));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn dense_matrix_roundtrip_exact() {
        let mut m = DenseMatrix::zeros(3, 4);
        m.set(0, 0, 1.5).unwrap();
        m.set(1, 3, -2.25).unwrap();
        m.set(2, 1, 1e-12).unwrap();
        roundtrip(m);
    }

    #[test]
    fn dense_matrix_set_out_of_range_fails() {
        let mut m = DenseMatrix::zeros(2, 2);
        assert_eq!(m.set(2, 0, 1.0).unwrap_err(), DbError::Field);
    }

    #[test]
    fn sparse_matrix_roundtrip() {
        let m = SparseMatrix::from_triplets(
            4,
            4,
            [(0, 0, 1.0), (1, 2, -3.5), (3, 3, 0.0)],
        )
        .unwrap();
        assert_eq!(m.nnz(), 3);
        roundtrip(m);
    }

    #[test]
    fn sparse_matrix_validates_indices() {
        assert_eq!(
            SparseMatrix::from_triplets(2, 2, [(2, 0, 1.0)]).unwrap_err(),
            DbError::Field
        );
        assert_eq!(
            SparseMatrix::from_triplets(2, 2, [(0, 2, 1.0)]).unwrap_err(),
            DbError::Field
        );
    }

    #[test]
    fn sparse_matrix_preserves_triplet_order() {
        let m = SparseMatrix::from_triplets(3, 3, [(2, 2, 9.0), (0, 1, 4.0)]).unwrap();
        let triplets: Vec<_> = m.triplets().collect();
        assert_eq!(triplets, vec![(2, 2, 9.0), (0, 1, 4.0)]);
    }

    #[test]
    fn tags_are_distinct() {
        let tags = [
            bool::PROPERTY_TYPE,
            f64::PROPERTY_TYPE,
            String::PROPERTY_TYPE,
            Vec::<f64>::PROPERTY_TYPE,
            DenseMatrix::PROPERTY_TYPE,
            SparseMatrix::PROPERTY_TYPE,
        ];
        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
    }
}
