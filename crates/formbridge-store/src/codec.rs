// SPDX-License-Identifier: Apache-2.0

use crate::error::StoreError;
use formbridge_model::{
    resolve_shape, KeyValueRecord, MetadataRecord, Record, RecordSet, RecordShape, KEY_COLUMN,
};
use std::io::Read;

/// Decodes a delimited record file. The header row establishes column order
/// and shape; rows are bound leniently, so a missing cell becomes an empty
/// string and surplus cells are ignored. The one hard requirement is the
/// `Field` key column.
pub fn decode_records<R: Read>(reader: R) -> Result<RecordSet, StoreError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()
        .map_err(|e| StoreError::format(format!("unreadable header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let shape = resolve_shape(&headers);
    let key_index = headers
        .iter()
        .position(|h| h == KEY_COLUMN)
        .ok_or_else(|| StoreError::format(format!("header row has no `{KEY_COLUMN}` column")))?;

    let column = |row: &csv::StringRecord, name: &str| -> String {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| row.get(i))
            .unwrap_or_default()
            .to_string()
    };

    let mut set = RecordSet::new(shape);
    for row in csv.records() {
        let row = row.map_err(|e| StoreError::format(format!("unreadable row: {e}")))?;
        let field = row.get(key_index).unwrap_or_default().to_string();
        let record = match shape {
            RecordShape::KeyValue => Record::KeyValue(KeyValueRecord {
                field,
                value: column(&row, "Value"),
            }),
            RecordShape::Metadata => Record::Metadata(MetadataRecord {
                field,
                section: column(&row, "Section"),
                notes: column(&row, "Notes"),
                pdf_page: column(&row, "PdfPage"),
                data_type: column(&row, "DataType"),
            }),
        };
        set.records.push(record);
    }
    Ok(set)
}

/// Serializes the full ordered set, header row first. Records are written in
/// the set's shape; callers conform foreign-shaped records beforehand.
pub fn encode_records(set: &RecordSet) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(set.shape.columns())
        .map_err(|e| StoreError::io(e.to_string()))?;

    for record in &set.records {
        match record.clone().conform_to(set.shape) {
            Record::KeyValue(r) => writer
                .write_record([r.field.as_str(), r.value.as_str()])
                .map_err(|e| StoreError::io(e.to_string()))?,
            Record::Metadata(r) => writer
                .write_record([
                    r.field.as_str(),
                    r.section.as_str(),
                    r.notes.as_str(),
                    r.pdf_page.as_str(),
                    r.data_type.as_str(),
                ])
                .map_err(|e| StoreError::io(e.to_string()))?,
        }
    }

    writer
        .into_inner()
        .map_err(|e| StoreError::io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_key_value_file() {
        let input = "Field,Value\nname,Alice\nage,30\n";
        let set = decode_records(input.as_bytes()).expect("decode");
        assert_eq!(set.shape, RecordShape::KeyValue);
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.records[0], Record::key_value("name", "Alice"));
    }

    #[test]
    fn decode_metadata_file_with_short_rows() {
        let input = "Field,Section,Notes,PdfPage,DataType\nname,intake\n";
        let set = decode_records(input.as_bytes()).expect("decode");
        assert_eq!(set.shape, RecordShape::Metadata);
        match &set.records[0] {
            Record::Metadata(r) => {
                assert_eq!(r.field, "name");
                assert_eq!(r.section, "intake");
                assert_eq!(r.notes, "");
            }
            other => panic!("expected metadata record, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_header_without_key_column() {
        let err = decode_records("Name,Value\nx,y\n".as_bytes()).expect_err("must fail");
        assert_eq!(err.code, crate::StoreErrorCode::Format);
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let input = "Field,Value\nname,\"Smith, Alice\"\nage,30\n";
        let set = decode_records(input.as_bytes()).expect("decode");
        let bytes = encode_records(&set).expect("encode");
        let back = decode_records(bytes.as_slice()).expect("re-decode");
        assert_eq!(back, set);
    }
}
