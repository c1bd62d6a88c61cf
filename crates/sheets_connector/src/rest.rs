//! Request and response types for the spreadsheet and file listing endpoints.

use serde::{Deserialize, Serialize};

pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Serialize)]
pub struct FileListParams {
    pub q: String,
    pub fields: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMeta {
    pub spreadsheet_id: String,
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

/// How written values are interpreted by the backend.
///
/// `UserEntered` parses the value as if typed into the cell, `Raw` stores it
/// untouched.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
    UserEntered,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesParams {
    pub value_input_option: ValueInputOption,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_cells: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<SheetRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetRequest {
    InsertDimension(InsertDimensionRequest),
    DeleteDimension(DeleteDimensionRequest),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDimensionRequest {
    pub range: DimensionRange,
    pub inherit_from_before: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    #[allow(unused)]
    Columns,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_spreadsheet_meta() {
        let body = r#"{
            "spreadsheetId": "1abcDEF",
            "properties": {"title": "Inventory", "locale": "en_US"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0,
                                "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
                {"properties": {"sheetId": 832, "title": "Archive", "index": 1}}
            ]
        }"#;

        let meta: SpreadsheetMeta = serde_json::from_str(body).unwrap();
        assert_eq!(meta.spreadsheet_id, "1abcDEF");
        assert_eq!(meta.properties.title, "Inventory");
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.sheets[0].properties.sheet_id, 0);
        assert_eq!(meta.sheets[1].properties.title, "Archive");
    }

    #[test]
    fn test_deserialize_value_range_without_values() {
        // A range with no data at all omits the values key entirely.
        let body = r#"{"range": "Sheet1!A1:C10", "majorDimension": "ROWS"}"#;
        let range: ValueRange = serde_json::from_str(body).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_serialize_value_range_body() {
        let range = ValueRange {
            range: None,
            major_dimension: None,
            values: vec![vec!["a".to_string(), "b".to_string()]],
        };
        assert_eq!(
            serde_json::to_value(&range).unwrap(),
            json!({"values": [["a", "b"]]})
        );
    }

    #[test]
    fn test_serialize_dimension_requests() {
        let insert = BatchUpdateRequest {
            requests: vec![SheetRequest::InsertDimension(InsertDimensionRequest {
                range: DimensionRange {
                    sheet_id: 832,
                    dimension: Dimension::Rows,
                    start_index: 4,
                    end_index: 5,
                },
                inherit_from_before: false,
            })],
        };
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({
                "requests": [{
                    "insertDimension": {
                        "range": {
                            "sheetId": 832,
                            "dimension": "ROWS",
                            "startIndex": 4,
                            "endIndex": 5
                        },
                        "inheritFromBefore": false
                    }
                }]
            })
        );

        let delete = SheetRequest::DeleteDimension(DeleteDimensionRequest {
            range: DimensionRange {
                sheet_id: 0,
                dimension: Dimension::Rows,
                start_index: 1,
                end_index: 2,
            },
        });
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({
                "deleteDimension": {
                    "range": {
                        "sheetId": 0,
                        "dimension": "ROWS",
                        "startIndex": 1,
                        "endIndex": 2
                    }
                }
            })
        );
    }

    #[test]
    fn test_serialize_update_params() {
        let params = UpdateValuesParams {
            value_input_option: ValueInputOption::UserEntered,
        };
        assert_eq!(
            serde_urlencoded::to_string(&params).unwrap(),
            "valueInputOption=USER_ENTERED"
        );
    }
}
