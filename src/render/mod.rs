//! Presentation-ready views of documents and quotes
//!
//! Labels come from the [`Locale`] passed in by the caller. Amounts follow the
//! portal convention: `$` prefix, two decimals.

use serde::Serialize;
use std::fmt;

use crate::domain::aggregates::DocumentKind;
use crate::domain::totals::DocumentTotals;
use crate::domain::value_objects::{format_money, format_weight, Locale};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub title: String,
    pub number: String,
    pub incoterm: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<FooterRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FooterRow {
    pub label: String,
    pub value: String,
}

/// What the view is laid out for. Quotes render like a proforma invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Document(DocumentKind),
    Quote,
}

impl ViewKind {
    fn shows_prices(&self) -> bool {
        match self {
            Self::Document(kind) => kind.shows_prices(),
            Self::Quote => true,
        }
    }
}

struct Labels {
    description: &'static str,
    tariff_code: &'static str,
    quantity: &'static str,
    unit_weight: &'static str,
    line_weight: &'static str,
    unit_price: &'static str,
    unit_price_with_freight: &'static str,
    line_total: &'static str,
    total_quantity: &'static str,
    total_weight: &'static str,
    merchandise: &'static str,
    freight: &'static str,
    grand_total: &'static str,
}

const EN: Labels = Labels {
    description: "Description",
    tariff_code: "NCM",
    quantity: "Qty",
    unit_weight: "Unit weight",
    line_weight: "Weight",
    unit_price: "Unit price",
    unit_price_with_freight: "Unit price (freight incl.)",
    line_total: "Total",
    total_quantity: "Total quantity",
    total_weight: "Total weight",
    merchandise: "Merchandise value",
    freight: "Freight",
    grand_total: "Grand total",
};

const PT: Labels = Labels {
    description: "Descrição",
    tariff_code: "NCM",
    quantity: "Qtd",
    unit_weight: "Peso unit.",
    line_weight: "Peso",
    unit_price: "Preço unit.",
    unit_price_with_freight: "Preço unit. (c/ frete)",
    line_total: "Total",
    total_quantity: "Quantidade total",
    total_weight: "Peso total",
    merchandise: "Valor da mercadoria",
    freight: "Frete",
    grand_total: "Total geral",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &EN,
        Locale::Pt => &PT,
    }
}

pub fn title(kind: ViewKind, locale: Locale) -> &'static str {
    match (kind, locale) {
        (ViewKind::Document(DocumentKind::ProformaInvoice), Locale::En) => "Proforma Invoice",
        (ViewKind::Document(DocumentKind::ProformaInvoice), Locale::Pt) => "Fatura Proforma",
        (ViewKind::Document(DocumentKind::CommercialInvoice), Locale::En) => "Commercial Invoice",
        (ViewKind::Document(DocumentKind::CommercialInvoice), Locale::Pt) => "Fatura Comercial",
        (ViewKind::Document(DocumentKind::PackingList), Locale::En) => "Packing List",
        (ViewKind::Document(DocumentKind::PackingList), Locale::Pt) => "Romaneio de Carga",
        (ViewKind::Document(DocumentKind::BillOfLading), Locale::En) => "Bill of Lading",
        (ViewKind::Document(DocumentKind::BillOfLading), Locale::Pt) => "Conhecimento de Embarque",
        (ViewKind::Quote, Locale::En) => "Quote",
        (ViewKind::Quote, Locale::Pt) => "Orçamento",
    }
}

pub fn render(kind: ViewKind, number: &str, totals: &DocumentTotals, locale: Locale) -> DocumentView {
    let l = labels(locale);
    let priced = kind.shows_prices();
    let freight_in_price = totals.freight_included();

    let mut columns = vec![l.description, l.tariff_code, l.quantity, l.unit_weight];
    if priced {
        columns.push(if freight_in_price { l.unit_price_with_freight } else { l.unit_price });
        columns.push(l.line_total);
    } else {
        columns.push(l.line_weight);
    }

    let rows = totals
        .lines
        .iter()
        .map(|line| {
            let mut row = vec![
                line.item.description.clone(),
                line.item.tariff_code.clone(),
                line.item.quantity.normalize().to_string(),
                format_weight(line.item.unit_weight),
            ];
            if priced {
                row.push(format_money(line.display_unit_price()));
                row.push(format_money(line.line_total));
            } else {
                row.push(format_weight(line.line_weight));
            }
            row
        })
        .collect();

    let mut footer = vec![
        FooterRow::new(l.total_quantity, totals.total_quantity.normalize().to_string()),
        FooterRow::new(l.total_weight, format_weight(totals.total_weight)),
    ];
    if priced {
        footer.push(FooterRow::new(l.merchandise, format_money(totals.merchandise_value)));
        if !freight_in_price {
            footer.push(FooterRow::new(l.freight, format_money(totals.freight_amount)));
        }
        footer.push(FooterRow::new(l.grand_total, format_money(totals.grand_total)));
    }

    DocumentView {
        title: title(kind, locale).to_string(),
        number: number.to_string(),
        incoterm: totals.incoterm.to_string(),
        columns: columns.into_iter().map(String::from).collect(),
        rows,
        footer,
    }
}

impl FooterRow {
    fn new(label: &str, value: String) -> Self { Self { label: label.to_string(), value } }
}

impl DocumentView {
    pub fn footer_value(&self, label: &str) -> Option<&str> {
        self.footer.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells.iter().zip(widths).map(|(c, w)| format!("{:<w$}", c, w = *w)).collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}

/// Plain-text table, one line per row.
impl fmt::Display for DocumentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = (0..self.columns.len())
            .map(|i| {
                self.rows.iter().filter_map(|r| r.get(i)).chain(std::iter::once(&self.columns[i]))
                    .map(|c| c.chars().count()).max().unwrap_or(0)
            })
            .collect();
        writeln!(f, "{} {} ({})", self.title, self.number, self.incoterm)?;
        write_row(f, &self.columns, &widths)?;
        writeln!(f, "{}", "-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1)))?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        for row in &self.footer {
            writeln!(f, "{}: {}", row.label, row.value)?;
        }
        Ok(())
    }
}
