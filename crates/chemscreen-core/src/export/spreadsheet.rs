//! Spreadsheet (XLSX) exporter
//!
//! Produces a workbook with a "Summary" sheet, a "Detailed Results" sheet
//! whose columns match the CSV header, and a "Metadata" sheet when metadata
//! is included. The sheet contents are laid out as a [`WorkbookPlan`] first
//! and then handed to `rust_xlsxwriter`.

use super::dataset::ExportDataset;
use super::exporter::Exporter;
use super::record::FieldValue;
use crate::error::Result;
use crate::types::ExportFormat;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

/// Name of the summary sheet
pub const SUMMARY_SHEET: &str = "Summary";
/// Name of the detailed results sheet
pub const DETAILS_SHEET: &str = "Detailed Results";
/// Name of the metadata sheet
pub const METADATA_SHEET: &str = "Metadata";

/// Cell contents of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    /// Sheet name
    pub name: &'static str,
    /// Rows of cells; empty values leave the cell blank
    pub rows: Vec<Vec<FieldValue>>,
    /// Rows rendered in bold
    pub header_rows: Vec<usize>,
    /// Freeze the first row
    pub freeze_header: bool,
}

impl SheetPlan {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Vec::new(),
            header_rows: Vec::new(),
            freeze_header: false,
        }
    }

    fn header(&mut self, cells: impl IntoIterator<Item = impl Into<FieldValue>>) {
        self.header_rows.push(self.rows.len());
        self.row(cells);
    }

    fn row(&mut self, cells: impl IntoIterator<Item = impl Into<FieldValue>>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }
}

/// Sheets of a workbook in order
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookPlan {
    pub sheets: Vec<SheetPlan>,
}

impl WorkbookPlan {
    /// Lay out the sheets for a dataset
    pub fn from_dataset(dataset: &ExportDataset) -> Self {
        let mut sheets = vec![Self::summary_sheet(dataset), Self::details_sheet(dataset)];
        if let Some(metadata) = dataset.section_metadata() {
            let mut sheet = SheetPlan::new(METADATA_SHEET);
            sheet.header(["Field", "Value"]);
            for (name, value) in metadata.entries() {
                sheet.row([FieldValue::from(*name), value.clone()]);
            }
            sheets.push(sheet);
        }
        Self { sheets }
    }

    /// Find a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&SheetPlan> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn summary_sheet(dataset: &ExportDataset) -> SheetPlan {
        let summary = &dataset.summary;
        let mut sheet = SheetPlan::new(SUMMARY_SHEET);

        sheet.header(["Metric", "Value"]);
        sheet.row([
            FieldValue::from("Chemicals Searched"),
            summary.chemicals_searched.into(),
        ]);
        sheet.row([
            FieldValue::from("Successful Searches"),
            summary.successful_searches.into(),
        ]);
        sheet.row([
            FieldValue::from("Failed Searches"),
            summary.failed_searches.into(),
        ]);
        sheet.row([
            FieldValue::from("Total Publications"),
            summary.total_publications.into(),
        ]);
        sheet.row(Vec::<FieldValue>::new());

        sheet.header([
            "Chemical",
            "CAS Number",
            "Status",
            "Publications",
            "Overall Score",
            "Confidence",
        ]);
        for chemical in &summary.chemicals {
            sheet.row([
                FieldValue::from(chemical.chemical_name.as_str()),
                FieldValue::text_opt(chemical.cas_number.as_deref()),
                chemical.search_status.as_str().into(),
                chemical.publication_count.into(),
                chemical.overall_score.into(),
                chemical.confidence.as_str().into(),
            ]);
        }

        sheet
    }

    fn details_sheet(dataset: &ExportDataset) -> SheetPlan {
        let columns = dataset.columns();
        let mut sheet = SheetPlan::new(DETAILS_SHEET);
        sheet.freeze_header = true;

        sheet.header(columns.iter().map(String::as_str));
        for record in &dataset.records {
            sheet.row(record.values_for(&columns).cloned());
        }

        sheet
    }
}

/// XLSX exporter
pub struct SpreadsheetExporter;

impl SpreadsheetExporter {
    /// Create a new spreadsheet exporter
    pub fn new() -> Self {
        Self
    }

    fn write_sheet(
        worksheet: &mut Worksheet,
        plan: &SheetPlan,
        bold: &Format,
    ) -> std::result::Result<(), XlsxError> {
        worksheet.set_name(plan.name)?;

        for (row_idx, row) in plan.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
            let is_header = plan.header_rows.contains(&row_idx);

            for (col_idx, value) in row.iter().enumerate() {
                let col_num =
                    u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
                match value {
                    FieldValue::Empty => {}
                    FieldValue::Text(s) if is_header => {
                        worksheet.write_string_with_format(row_num, col_num, s.as_str(), bold)?;
                    }
                    FieldValue::Text(s) => {
                        worksheet.write_string(row_num, col_num, s.as_str())?;
                    }
                    FieldValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    FieldValue::Integer(i) => {
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    FieldValue::Float(f) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                }
            }
        }

        if plan.freeze_header {
            worksheet.set_freeze_panes(1, 0)?;
        }
        worksheet.autofit();

        Ok(())
    }
}

impl Default for SpreadsheetExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for SpreadsheetExporter {
    fn render(&self, dataset: &ExportDataset) -> Result<Vec<u8>> {
        let plan = WorkbookPlan::from_dataset(dataset);
        let bold = Format::new().set_bold();
        let mut workbook = Workbook::new();

        for sheet in &plan.sheets {
            let worksheet = workbook.add_worksheet();
            Self::write_sheet(worksheet, sheet, &bold)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Spreadsheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::csv_writer::CsvExporter;
    use crate::export::dataset::RecordBuilder;
    use crate::export::options::ExportOptions;
    use crate::quality::calculate_quality_metrics;
    use crate::search::{Chemical, PublicationBuilder, SearchResult};
    use crate::session::{BatchSearchSession, SearchParameters};
    use crate::types::BatchId;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn dataset(options: ExportOptions) -> ExportDataset {
        let session = BatchSearchSession::completed(
            BatchId::from_string("batch-xlsx"),
            vec![Chemical::with_cas("Benzene", "71-43-2"), Chemical::new("Toluene")],
            SearchParameters::default(),
        );
        let results: Vec<_> = vec![
            SearchResult::success(
                Chemical::with_cas("Benzene", "71-43-2"),
                vec![
                    PublicationBuilder::new("Benzene one").year(2020).build(),
                    PublicationBuilder::new("Benzene two").build(),
                    PublicationBuilder::new("Benzene three").build(),
                ],
                Utc::now(),
            ),
            SearchResult::failure(Chemical::new("Toluene"), "timeout", Utc::now()),
        ]
        .into_iter()
        .map(|r| {
            let m = calculate_quality_metrics(&r);
            (r, m)
        })
        .collect();

        RecordBuilder::new(options).build(&session, &results)
    }

    #[test]
    fn test_spreadsheet_exporter_format() {
        let exporter = SpreadsheetExporter::new();
        assert_eq!(exporter.file_extension(), "xlsx");
        assert!(exporter.mime_type().ends_with("spreadsheetml.sheet"));
    }

    #[test]
    fn test_sheet_layout_with_metadata() {
        let plan = WorkbookPlan::from_dataset(&dataset(ExportOptions::new(ExportFormat::Spreadsheet)));
        let names: Vec<_> = plan.sheets.iter().map(|s| s.name).collect();
        assert_eq!(names, vec![SUMMARY_SHEET, DETAILS_SHEET, METADATA_SHEET]);

        let metadata = plan.sheet(METADATA_SHEET).unwrap();
        assert_eq!(metadata.rows[1][0], FieldValue::from("batch_id"));
        assert_eq!(metadata.rows[1][1], FieldValue::from("batch-xlsx"));
    }

    #[test]
    fn test_no_metadata_sheet_when_excluded() {
        let options = ExportOptions::new(ExportFormat::Spreadsheet).with_metadata(false);
        let plan = WorkbookPlan::from_dataset(&dataset(options));
        assert!(plan.sheet(METADATA_SHEET).is_none());
        assert_eq!(plan.sheets.len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let plan = WorkbookPlan::from_dataset(&dataset(ExportOptions::new(ExportFormat::Spreadsheet)));
        let summary = plan.sheet(SUMMARY_SHEET).unwrap();

        assert_eq!(summary.rows[1][1], FieldValue::Integer(2));
        assert_eq!(summary.rows[2][1], FieldValue::Integer(1));
        assert_eq!(summary.rows[3][1], FieldValue::Integer(1));
        assert_eq!(summary.rows[4][1], FieldValue::Integer(3));

        // Per-chemical table follows the blank row and its header
        assert_eq!(summary.header_rows, vec![0, 6]);
        assert_eq!(summary.rows[7][0], FieldValue::from("Benzene"));
        assert_eq!(summary.rows[7][1], FieldValue::from("71-43-2"));
        assert_eq!(summary.rows[8][2], FieldValue::from("failure"));
    }

    #[test]
    fn test_details_columns_match_csv_header() {
        let data = dataset(ExportOptions::new(ExportFormat::Spreadsheet));
        let plan = WorkbookPlan::from_dataset(&data);
        let details = plan.sheet(DETAILS_SHEET).unwrap();

        let sheet_header: Vec<String> = details.rows[0].iter().map(|v| v.to_cell_string()).collect();
        let csv_bytes = CsvExporter::new().render(&data).unwrap();
        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        let csv_header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();

        assert_eq!(sheet_header, csv_header);
        assert_eq!(details.rows.len() - 1, data.records.len());
        assert!(details.freeze_header);
    }

    #[test]
    fn test_render_produces_xlsx_archive() {
        let data = dataset(ExportOptions::new(ExportFormat::Spreadsheet).with_abstracts(true));
        let bytes = SpreadsheetExporter::new().render(&data).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_rendered_workbook_reads_back() {
        use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
        use std::io::Cursor;

        let data = dataset(ExportOptions::new(ExportFormat::Spreadsheet));
        let bytes = SpreadsheetExporter::new().render(&data).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();

        assert_eq!(
            workbook.sheet_names(),
            vec![SUMMARY_SHEET, DETAILS_SHEET, METADATA_SHEET]
        );

        let details = workbook.worksheet_range(DETAILS_SHEET).unwrap();
        assert_eq!(details.height(), data.records.len() + 1);
        let header: Vec<String> = details
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        let expected: Vec<String> = WorkbookPlan::from_dataset(&data)
            .sheet(DETAILS_SHEET)
            .unwrap()
            .rows[0]
            .iter()
            .map(|v| v.to_cell_string())
            .collect();
        assert_eq!(header, expected);

        let summary = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        let total_chemicals = summary.rows().nth(1).unwrap()[1].clone();
        assert_eq!(total_chemicals, Data::Float(2.0));
    }

    #[test]
    fn test_oversized_cell_is_library_error() {
        let session = BatchSearchSession::completed(
            BatchId::from_string("big"),
            vec![Chemical::new("Benzene")],
            SearchParameters::default(),
        );
        let huge = "x".repeat(40_000);
        let result = SearchResult::success(
            Chemical::new("Benzene"),
            vec![PublicationBuilder::new("t").abstract_text(huge).build()],
            Utc::now(),
        );
        let metrics = calculate_quality_metrics(&result);
        let options = ExportOptions::new(ExportFormat::Spreadsheet).with_abstracts(true);
        let data = RecordBuilder::new(options).build(&session, &[(result, metrics)]);

        let err = SpreadsheetExporter::new().render(&data).unwrap_err();
        assert!(matches!(err, crate::ChemScreenError::Spreadsheet(_)));
    }
}
