use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::dto::report_dto::ReportPayload;
use crate::dto::view_dto::{ReportBody, ReportView};
use crate::error::Result;
use crate::models::report_metadata::TestKind;
use crate::services::content_service::ContentService;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const MM_PER_PT: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Face {
    Regular,
    Bold,
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    size: f32,
    face: Face,
}

impl Line {
    fn advance_mm(&self) -> f32 {
        self.size * 1.4 * MM_PER_PT
    }
}

/// Text-only A4 layout rendered with the Helvetica base fonts. Lines are
/// word wrapped up front and broken across pages when the cursor reaches
/// the bottom margin.
#[derive(Debug, Default)]
pub struct ReportLayout {
    lines: Vec<Line>,
}

impl ReportLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.push(text, 16.0, Face::Bold)
    }

    pub fn subheading(&mut self, text: &str) -> &mut Self {
        self.push(text, 13.0, Face::Bold)
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.push(line, 11.0, Face::Regular);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line {
            text: String::new(),
            size: 11.0,
            face: Face::Regular,
        });
        self
    }

    fn push(&mut self, text: &str, size: f32, face: Face) -> &mut Self {
        // Helvetica averages roughly half an em per glyph.
        let glyph_mm = size * 0.5 * MM_PER_PT;
        let max_chars = ((PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / glyph_mm) as usize;
        for wrapped in wrap(text, max_chars) {
            self.lines.push(Line {
                text: wrapped,
                size,
                face,
            });
        }
        self
    }

    /// Baseline (mm from the bottom edge) of every line, grouped by page.
    fn paginate(&self) -> Vec<Vec<(f32, &Line)>> {
        let mut pages = vec![Vec::new()];
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in &self.lines {
            let advance = line.advance_mm();
            if y - advance < MARGIN_MM {
                pages.push(Vec::new());
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            y -= advance;
            if let Some(page) = pages.last_mut() {
                page.push((y, line));
            }
        }
        pages
    }

    pub fn page_count(&self) -> usize {
        self.paginate().len()
    }

    pub fn render(&self, title: &str) -> Result<Vec<u8>> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Testo",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        for (index, page) in self.paginate().into_iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Testo")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);
            for (y, line) in page {
                if line.text.is_empty() {
                    continue;
                }
                let font = match line.face {
                    Face::Regular => &regular,
                    Face::Bold => &bold,
                };
                layer.use_text(line.text.as_str(), line.size, Mm(MARGIN_MM), Mm(y), font);
            }
        }

        Ok(doc.save_to_bytes()?)
    }
}

/// Greedy word wrap. Words longer than a full line are split into
/// line-sized chunks.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(max_chars) {
            let needed = current_len + chunk.len() + usize::from(current_len > 0);
            if needed > max_chars && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chunk);
            current_len += chunk.len();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn pdf_filename(kind: TestKind, date: NaiveDate) -> String {
    format!("Report_{}_{}.pdf", kind.file_tag(), date.format("%Y-%m-%d"))
}

pub struct PdfService;

impl PdfService {
    pub fn render_report(report: &ReportPayload, view: &ReportView) -> Result<Vec<u8>> {
        let title = if view.title.is_empty() { "Report" } else { view.title.as_str() };
        let mut doc = ReportLayout::new();
        doc.heading(title);
        if let Some(created_at) = view.created_at {
            doc.paragraph(&format!("Data: {}", crate::utils::time::display_date(created_at)));
        }
        doc.blank();

        match &view.body {
            ReportBody::Sas(sas) => {
                doc.subheading("S-AS - Parte I: Fattori");
                for factor in &sas.factors {
                    doc.paragraph(&format!("{}. {}: {}", factor.id, factor.name, factor.score));
                    doc.paragraph(&format!("   {}", factor.description));
                }
                if let Some(orientation) = &sas.orientation {
                    doc.blank();
                    doc.subheading("S-AS - Parte II: Scopi e Antiscopi");
                    doc.paragraph(&format!(
                        "Scopi: {} ({})",
                        orientation.scopi, orientation.scopi_percentage
                    ));
                    doc.paragraph(&format!(
                        "Antiscopi: {} ({})",
                        orientation.antiscopi, orientation.antiscopi_percentage
                    ));
                }
            }
            ReportBody::Pid5(pid5) => {
                doc.subheading("PID-5 - Domini di personalità");
                for domain in &pid5.domains {
                    doc.paragraph(&format!("{}: {} ({})", domain.label, domain.value, domain.badge));
                }
                if !pid5.top_facets.is_empty() {
                    doc.blank();
                    doc.subheading("Faccette con punteggio più alto");
                    for facet in &pid5.top_facets {
                        doc.paragraph(&format!("{}: {} ({})", facet.label, facet.value, facet.badge));
                    }
                }
            }
            ReportBody::Generic => {}
        }

        let text = ContentService::strip_html(&view.content_html);
        if !text.is_empty() {
            doc.blank();
            doc.subheading("Analisi");
            doc.paragraph(&text);
        }
        if !report.conclusion.is_empty() {
            doc.blank();
            doc.subheading("Conclusioni");
            doc.paragraph(&report.conclusion);
        }
        doc.render(title)
    }
}
