// src/services/export_service.rs

use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::{
    common::{error::AppError, period::ShopClock},
    models::report::Report,
};

const MONEY_FORMAT: &str = "\"R$\" #,##0.00";

/// Planilha do relatório com as abas "Resumo", "Vendas" e "Despesas".
pub fn report_to_xlsx(report: &Report, clock: &ShopClock) -> Result<Vec<u8>, AppError> {
    build_workbook(report, clock).map_err(|e| AppError::DocumentError(e.to_string()))
}

fn build_workbook(report: &Report, clock: &ShopClock) -> Result<Vec<u8>, XlsxError> {
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format(MONEY_FORMAT);
    let money_bold = Format::new().set_bold().set_num_format(MONEY_FORMAT);

    let mut workbook = Workbook::new();

    // --- Resumo ---
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Resumo")?;
        sheet.set_column_width(0, 22)?;
        sheet.set_column_width(1, 18)?;

        sheet.write_string_with_format(0, 0, "Relatório", &bold)?;
        sheet.write_string(
            1,
            0,
            format!(
                "{} a {}",
                report.start_date.format("%d/%m/%Y"),
                report.end_date.format("%d/%m/%Y")
            ),
        )?;
        if let Some(method) = report.payment_method {
            sheet.write_string(2, 0, format!("Pagamento: {}", method.label()))?;
        }

        let summary = &report.summary;
        write_money_row(sheet, 4, "Receita", summary.revenue, &money)?;
        write_money_row(sheet, 5, "Despesas", summary.expenses, &money)?;
        sheet.write_string_with_format(6, 0, "Lucro", &bold)?;
        sheet.write_number_with_format(6, 1, to_cell(summary.profit), &money_bold)?;
        sheet.write_string(7, 0, "Vendas")?;
        sheet.write_number(7, 1, summary.sales_count as f64)?;
        write_money_row(sheet, 8, "Ticket médio", summary.average_ticket, &money)?;
    }

    // --- Vendas ---
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Vendas")?;
        write_header(sheet, &["Data", "Cliente", "Pagamento", "Itens", "Pontos", "Total"], &bold)?;
        sheet.set_column_width(0, 18)?;
        sheet.set_column_width(1, 24)?;
        sheet.set_column_width(2, 18)?;
        sheet.set_column_width(3, 40)?;

        for (i, detail) in report.sales.iter().enumerate() {
            let row = i as u32 + 1;
            let local = detail.sale.created_at.with_timezone(&clock.offset());
            let items = detail
                .items
                .iter()
                .map(|item| format!("{}x {}", item.quantity, item.product_name))
                .collect::<Vec<_>>()
                .join(", ");

            sheet.write_string(row, 0, local.format("%d/%m/%Y %H:%M").to_string())?;
            sheet.write_string(row, 1, detail.customer_name.as_deref().unwrap_or("-"))?;
            sheet.write_string(row, 2, detail.sale.payment_method.label())?;
            sheet.write_string(row, 3, items)?;
            sheet.write_number(row, 4, detail.sale.points_earned as f64)?;
            sheet.write_number_with_format(row, 5, to_cell(detail.sale.total_amount), &money)?;
        }
    }

    // --- Despesas ---
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Despesas")?;
        write_header(sheet, &["Data", "Descrição", "Categoria", "Valor"], &bold)?;
        sheet.set_column_width(0, 12)?;
        sheet.set_column_width(1, 36)?;
        sheet.set_column_width(2, 16)?;

        for (i, expense) in report.expenses.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, expense.date.format("%d/%m/%Y").to_string())?;
            sheet.write_string(row, 1, &expense.description)?;
            sheet.write_string(row, 2, expense.category.as_str())?;
            sheet.write_number_with_format(row, 3, to_cell(expense.amount), &money)?;
        }
    }

    workbook.save_to_buffer()
}

fn write_header(sheet: &mut Worksheet, titles: &[&str], bold: &Format) -> Result<(), XlsxError> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, bold)?;
    }
    Ok(())
}

fn write_money_row(sheet: &mut Worksheet, row: u32, label: &str, value: Decimal, money: &Format) -> Result<(), XlsxError> {
    sheet.write_string(row, 0, label)?;
    sheet.write_number_with_format(row, 1, to_cell(value), money)?;
    Ok(())
}

// Células numéricas do Excel são sempre f64
fn to_cell(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            finance::{Expense, ExpenseCategory},
            report::ReportSummary,
            sale::{PaymentMethod, Sale, SaleDetail, SaleItem},
        },
        services::report_service::summarize,
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn report() -> Report {
        let sale_id = Uuid::new_v4();
        let sales = vec![SaleDetail {
            sale: Sale {
                id: sale_id,
                customer_id: None,
                total_amount: dec!(79.80),
                payment_method: PaymentMethod::Pix,
                points_earned: 7,
                created_by: None,
                created_at: Utc::now(),
            },
            customer_name: Some("Ana".into()),
            items: vec![SaleItem {
                id: Uuid::new_v4(),
                sale_id,
                product_id: None,
                product_name: "Body".into(),
                quantity: 2,
                unit_price: dec!(39.90),
                total_price: dec!(79.80),
                created_at: None,
            }],
        }];
        let expenses = vec![Expense {
            id: Uuid::new_v4(),
            description: "Conta de água".into(),
            amount: dec!(45.10),
            category: ExpenseCategory::Agua,
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            created_by: None,
            bill_id: None,
            created_at: Utc::now(),
        }];
        Report {
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            payment_method: None,
            summary: summarize(&sales, &expenses),
            sales,
            expenses,
        }
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = report_to_xlsx(&report(), &ShopClock::new(-3).unwrap()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_report_still_exports() {
        let mut empty = report();
        empty.sales.clear();
        empty.expenses.clear();
        empty.summary = ReportSummary {
            revenue: Decimal::ZERO,
            expenses: Decimal::ZERO,
            profit: Decimal::ZERO,
            sales_count: 0,
            average_ticket: Decimal::ZERO,
        };
        assert!(report_to_xlsx(&empty, &ShopClock::new(-3).unwrap()).is_ok());
    }

    #[test]
    fn cells_are_rounded_to_cents() {
        assert_eq!(to_cell(dec!(10.004)), 10.0);
        assert_eq!(to_cell(dec!(-3.5)), -3.5);
    }
}
