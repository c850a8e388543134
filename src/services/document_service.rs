// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::ShopClock},
    db::{SaleRepository, SettingsRepository},
    models::{report::Report, settings::ShopSettings},
};

const DEFAULT_SHOP_NAME: &str = "MINHA LOJA";

#[derive(Clone)]
pub struct DocumentService {
    sale_repo: SaleRepository,
    settings_repo: SettingsRepository,
    fonts_dir: PathBuf,
    clock: ShopClock,
}

impl DocumentService {
    pub fn new(
        sale_repo: SaleRepository,
        settings_repo: SettingsRepository,
        fonts_dir: PathBuf,
        clock: ShopClock,
    ) -> Self {
        Self { sale_repo, settings_repo, fonts_dir, clock }
    }

    pub async fn load_settings<'e, A>(&self, conn: A) -> Result<ShopSettings, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.settings_repo.get_settings(&mut *conn).await
    }

    /// Recibo da venda, com QR Code da chave PIX quando a loja tem uma.
    pub async fn generate_receipt_pdf<'e, A>(&self, conn: A, sale_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // 1. Busca os Dados
        let mut conn = conn.acquire().await?;
        let detail = self.sale_repo
            .find_detail(&mut *conn, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let settings = self.settings_repo.get_settings(&mut *conn).await?;

        // 2. Configura o PDF
        let mut doc = self.new_document(format!("Recibo {}", short_id(detail.sale.id)))?;
        push_shop_header(&mut doc, &settings);

        doc.push(elements::Paragraph::new("RECIBO DE VENDA")
            .styled(style::Style::new().bold().with_font_size(14)));

        let local = detail.sale.created_at.with_timezone(&self.clock.offset());
        doc.push(elements::Paragraph::new(format!("Venda: {}", short_id(detail.sale.id))));
        doc.push(elements::Paragraph::new(format!("Data: {}", local.format("%d/%m/%Y %H:%M"))));
        doc.push(elements::Paragraph::new(format!(
            "Cliente: {}",
            detail.customer_name.as_deref().unwrap_or("Consumidor Final")
        )));

        doc.push(elements::Break::new(1.5));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Produto (4), Qtd (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        push_row(&mut table, &["Produto", "Qtd", "Unitário", "Total"], true)?;

        for item in &detail.items {
            push_row(
                &mut table,
                &[
                    &item.product_name,
                    &item.quantity.to_string(),
                    &money(item.unit_price),
                    &money(item.total_price),
                ],
                false,
            )?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- TOTAIS ---
        let mut total = elements::Paragraph::new(format!("TOTAL: {}", money(detail.sale.total_amount)));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Paragraph::new(format!("Pagamento: {}", detail.sale.payment_method.label())));
        if detail.sale.points_earned > 0 {
            doc.push(elements::Paragraph::new(format!("Pontos ganhos: {}", detail.sale.points_earned)));
        }

        // --- PIX ---
        if let Some(key) = settings.pix_key.as_deref().filter(|k| !k.trim().is_empty()) {
            doc.push(elements::Break::new(1.5));
            doc.push(elements::Paragraph::new("PAGAMENTO VIA PIX")
                .styled(style::Style::new().bold().with_font_size(12)));
            doc.push(elements::Paragraph::new(format!("Chave: {}", key)));
            doc.push(elements::Break::new(0.5));
            doc.push(pix_qr_code(key)?);
        }

        push_footer(&mut doc, &settings);

        render(doc)
    }

    /// Relatório do período: resumo, vendas e despesas.
    pub fn generate_report_pdf(&self, report: &Report, settings: &ShopSettings) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document(format!(
            "Relatório {} a {}",
            report.start_date.format("%d/%m/%Y"),
            report.end_date.format("%d/%m/%Y")
        ))?;
        push_shop_header(&mut doc, settings);

        doc.push(elements::Paragraph::new("RELATÓRIO FINANCEIRO")
            .styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!(
            "Período: {} a {}",
            report.start_date.format("%d/%m/%Y"),
            report.end_date.format("%d/%m/%Y")
        )));
        if let Some(method) = report.payment_method {
            doc.push(elements::Paragraph::new(format!("Pagamento: {}", method.label())));
        }

        doc.push(elements::Break::new(1.5));

        // --- RESUMO ---
        let summary = &report.summary;
        let mut resume = elements::TableLayout::new(vec![3, 2]);
        resume.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        push_row(&mut resume, &["Receita", &money(summary.revenue)], false)?;
        push_row(&mut resume, &["Despesas", &money(summary.expenses)], false)?;
        push_row(&mut resume, &["Lucro", &money(summary.profit)], true)?;
        push_row(&mut resume, &["Vendas", &summary.sales_count.to_string()], false)?;
        push_row(&mut resume, &["Ticket médio", &money(summary.average_ticket)], false)?;
        doc.push(resume);

        // --- VENDAS ---
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new("VENDAS").styled(style::Style::new().bold().with_font_size(12)));
        if report.sales.is_empty() {
            doc.push(elements::Paragraph::new("Nenhuma venda no período."));
        } else {
            let mut table = elements::TableLayout::new(vec![2, 3, 2, 2]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            push_row(&mut table, &["Data", "Cliente", "Pagamento", "Total"], true)?;
            for detail in &report.sales {
                let local = detail.sale.created_at.with_timezone(&self.clock.offset());
                push_row(
                    &mut table,
                    &[
                        &local.format("%d/%m/%Y %H:%M").to_string(),
                        detail.customer_name.as_deref().unwrap_or("-"),
                        detail.sale.payment_method.label(),
                        &money(detail.sale.total_amount),
                    ],
                    false,
                )?;
            }
            doc.push(table);
        }

        // --- DESPESAS ---
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new("DESPESAS").styled(style::Style::new().bold().with_font_size(12)));
        if report.expenses.is_empty() {
            doc.push(elements::Paragraph::new("Nenhuma despesa no período."));
        } else {
            let mut table = elements::TableLayout::new(vec![2, 4, 2, 2]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            push_row(&mut table, &["Data", "Descrição", "Categoria", "Valor"], true)?;
            for expense in &report.expenses {
                push_row(
                    &mut table,
                    &[
                        &expense.date.format("%d/%m/%Y").to_string(),
                        &expense.description,
                        expense.category.as_str(),
                        &money(expense.amount),
                    ],
                    false,
                )?;
            }
            doc.push(table);
        }

        push_footer(&mut doc, settings);

        render(doc)
    }

    fn new_document(&self, title: String) -> Result<genpdf::Document, AppError> {
        let font_family = load_fonts(&self.fonts_dir)?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

/// Carrega a família "Roboto" (Regular, Bold, Italic, BoldItalic) da pasta de fontes.
pub fn load_fonts(dir: &Path) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    genpdf::fonts::from_files(dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(format!("Fonte Roboto não encontrada em {}", dir.display())))
}

pub fn money(value: Decimal) -> String {
    format!("R$ {:.2}", value)
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

fn push_shop_header(doc: &mut genpdf::Document, settings: &ShopSettings) {
    let title = settings.company_name.as_deref().unwrap_or(DEFAULT_SHOP_NAME);
    doc.push(elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(18)));

    if let Some(doc_num) = &settings.document_number {
        doc.push(elements::Paragraph::new(format!("CNPJ/CPF: {}", doc_num))
            .styled(style::Style::new().with_font_size(10)));
    }
    if let Some(phone) = &settings.phone {
        doc.push(elements::Paragraph::new(format!("Telefone: {}", phone))
            .styled(style::Style::new().with_font_size(10)));
    }

    doc.push(elements::Break::new(1.5));
}

fn push_footer(doc: &mut genpdf::Document, settings: &ShopSettings) {
    if let Some(addr) = &settings.address {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new(addr.as_str()).styled(style::Style::new().italic().with_font_size(8)));
    }
}

fn push_row(table: &mut elements::TableLayout, cells: &[&str], bold: bool) -> Result<(), AppError> {
    let cell_style = if bold { style::Style::new().bold() } else { style::Style::new() };
    let mut row = table.row();
    for cell in cells {
        row.push_element(elements::Paragraph::new(*cell).styled(cell_style));
    }
    row.push().map_err(|e| AppError::DocumentError(e.to_string()))
}

fn pix_qr_code(key: &str) -> Result<elements::Image, AppError> {
    let code = QrCode::new(key.as_bytes()).map_err(|e| AppError::DocumentError(e.to_string()))?;

    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    let image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(|e| AppError::DocumentError(e.to_string()))?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    Ok(image)
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(dec!(10)), "R$ 10.00");
        assert_eq!(money(dec!(129.9)), "R$ 129.90");
    }

    #[test]
    fn short_id_is_eight_uppercase_chars() {
        let id = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        assert_eq!(short_id(id), "A1B2C3D4");
    }

    #[test]
    fn missing_fonts_are_reported() {
        let err = load_fonts(Path::new("/caminho/que/nao/existe")).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    #[test]
    fn pix_key_becomes_qr_image() {
        assert!(pix_qr_code("contato@minhaloja.com").is_ok());
    }
}
