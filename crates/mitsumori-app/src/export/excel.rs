//! Excel export of a quotation document (見積書)

use std::path::Path;

use mitsumori_domain::service::{format_cost_range, EditSession};
use mitsumori_types::{CompanyInfo, Error, QuotationDocument, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Write one worksheet: company header, customer and title, line items with
/// yen bands and the original text, a total computed from the items, notes.
pub fn export_quotation(
    document: &QuotationDocument,
    company: Option<&CompanyInfo>,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_quotation_sheet(sheet, document, company)?;
    workbook.save(output_path).map_err(excel_err)?;
    tracing::info!(path = %output_path.display(), "quotation exported");
    Ok(())
}

fn write_quotation_sheet(
    sheet: &mut Worksheet,
    document: &QuotationDocument,
    company: Option<&CompanyInfo>,
) -> Result<()> {
    sheet.set_name("見積書").map_err(excel_err)?;

    let title_format = Format::new().set_bold().set_font_size(16);
    let header_format = Format::new().set_bold();
    let yen_format = Format::new().set_num_format("#,##0");
    let total_format = Format::new().set_bold().set_num_format("#,##0");

    sheet
        .write_string_with_format(0, 0, "御見積書", &title_format)
        .map_err(excel_err)?;

    let mut row = 2;
    if let Some(company) = company {
        for line in [
            company.company_name.as_str(),
            company.address.as_str(),
            company.phone.as_str(),
            company.representative.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        {
            sheet.write_string(row, 3, line).map_err(excel_err)?;
            row += 1;
        }
    }

    let customer = if document.customer_name.is_empty() {
        "お客様".to_string()
    } else {
        document.customer_name.clone()
    };
    sheet
        .write_string_with_format(2, 0, &format!("{} 御中", customer), &header_format)
        .map_err(excel_err)?;
    sheet.write_string(3, 0, &format!("件名: {}", document.title)).map_err(excel_err)?;
    sheet
        .write_string(4, 0, &format!("作成日: {}", document.updated_at.format("%Y/%m/%d")))
        .map_err(excel_err)?;

    let mut row = row.max(6) + 1;
    let headers = ["工事項目", "最小金額(円)", "最大金額(円)", "概算金額"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(row, col as u16, *header, &header_format)
            .map_err(excel_err)?;
    }
    row += 1;

    let session = EditSession::from_result(&document.result);
    for (item, original) in session.items().iter().zip(&document.result.items) {
        let band = item.cost_range_yen();
        sheet.write_string(row, 0, &item.name).map_err(excel_err)?;
        sheet.write_number_with_format(row, 1, band.min, &yen_format).map_err(excel_err)?;
        sheet.write_number_with_format(row, 2, band.max, &yen_format).map_err(excel_err)?;
        sheet.write_string(row, 3, &original.cost_range).map_err(excel_err)?;
        row += 1;
    }

    let total = session.total().cost_range_yen();
    sheet.write_string_with_format(row, 0, "合計", &header_format).map_err(excel_err)?;
    sheet.write_number_with_format(row, 1, total.min, &total_format).map_err(excel_err)?;
    sheet.write_number_with_format(row, 2, total.max, &total_format).map_err(excel_err)?;
    sheet
        .write_string_with_format(row, 3, &format_cost_range(total), &header_format)
        .map_err(excel_err)?;

    if !document.result.notes.is_empty() {
        row += 2;
        sheet.write_string_with_format(row, 0, "備考", &header_format).map_err(excel_err)?;
        sheet.write_string(row + 1, 0, &document.result.notes).map_err(excel_err)?;
    }

    sheet.set_column_width(0, 30).map_err(excel_err)?;
    sheet.set_column_width(1, 14).map_err(excel_err)?;
    sheet.set_column_width(2, 14).map_err(excel_err)?;
    sheet.set_column_width(3, 28).map_err(excel_err)?;

    Ok(())
}
