use std::fmt::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::loader::{LoadState, ProfileState};

pub const CANVAS_WIDTH: u32 = 650;
pub const CANVAS_HEIGHT: u32 = 450;
pub const AVATAR_SIZE: u32 = 80;

const BORDER: f32 = 4.0;
const PADDING: f32 = 32.0;
const CENTER_X: f32 = CANVAS_WIDTH as f32 / 2.0;
const FOOTER_INSET: f32 = BORDER + PADDING + 24.0;
const APPRECIATION_COLUMNS: usize = 56;
const FONT_FAMILY: &str =
    "Helvetica, Arial, 'Liberation Sans', 'DejaVu Sans', sans-serif";

const BLUE_500: &str = "#3b82f6";
const BLUE_600: &str = "#2563eb";
const BLUE_700: &str = "#1d4ed8";
const GRAY_200: &str = "#e5e7eb";
const GRAY_500: &str = "#6b7280";
const GRAY_600: &str = "#4b5563";
const GRAY_700: &str = "#374151";
const GRAY_900: &str = "#111827";
const RED_500: &str = "#ef4444";

#[derive(Clone, Copy)]
struct Style {
    size: u32,
    bold: bool,
    fill: &'static str,
}

const TITLE: Style = Style { size: 30, bold: true, fill: BLUE_700 };
const LEAD: Style = Style { size: 18, bold: false, fill: GRAY_700 };
const NOTICE: Style = Style { size: 16, bold: false, fill: GRAY_500 };
const ERROR: Style = Style { size: 16, bold: false, fill: RED_500 };
const NAME: Style = Style { size: 24, bold: true, fill: GRAY_900 };
const HANDLE: Style = Style { size: 16, bold: false, fill: GRAY_600 };
const FOOTER_LABEL: Style = Style { size: 14, bold: true, fill: GRAY_700 };
const FOOTER: Style = Style { size: 14, bold: false, fill: GRAY_700 };

/// The fixed texts of the certificate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Template {
    pub title: String,
    pub presented_to: String,
    pub fetching: String,
    pub appreciation: String,
    pub issuer_label: String,
    pub issuer_name: String,
    pub date_label: String,
    /// `strftime` pattern for the issue date.
    pub date_format: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            title: "Certificate of Appreciation".to_owned(),
            presented_to: "This is proudly presented to".to_owned(),
            fetching: "Fetching GitHub Profile...".to_owned(),
            appreciation: "For valuable contributions to the project and \
                           the open-source community."
                .to_owned(),
            issuer_label: "Project Team".to_owned(),
            issuer_name: "[Your Project Name]".to_owned(),
            date_label: "Date".to_owned(),
            date_format: "%-m/%-d/%Y".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileBlock {
    Empty,
    Fetching(String),
    Failed(String),
    Profile {
        display_name: String,
        handle: String,
        avatar_url: Option<Url>,
        profile_url: Option<Url>,
    },
}

/// Everything the certificate shows, laid out but not yet drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateView {
    pub identifier: String,
    pub title: String,
    pub presented_to: String,
    pub profile: ProfileBlock,
    pub appreciation: String,
    pub issuer_label: String,
    pub issuer_name: String,
    pub date_label: String,
    pub date: String,
}

impl CertificateView {
    pub fn build(
        state: &ProfileState,
        template: &Template,
        today: NaiveDate,
    ) -> Self {
        let identifier = state.identifier.clone();
        let profile = match (&state.load_state, &state.record) {
            (LoadState::Loading, _) => {
                ProfileBlock::Fetching(template.fetching.clone())
            }
            (LoadState::Error(message), _) => {
                ProfileBlock::Failed(message.clone())
            }
            (LoadState::Success, Some(record)) => ProfileBlock::Profile {
                display_name: record.display_name(&identifier).to_owned(),
                handle: format!("@{}", identifier),
                avatar_url: record.avatar_url_parsed(),
                profile_url: record.html_url_parsed(),
            },
            _ => ProfileBlock::Empty,
        };

        Self {
            identifier,
            title: template.title.clone(),
            presented_to: template.presented_to.clone(),
            profile,
            appreciation: template.appreciation.clone(),
            issuer_label: template.issuer_label.clone(),
            issuer_name: template.issuer_name.clone(),
            date_label: template.date_label.clone(),
            date: format_date(today, &template.date_format),
        }
    }

    /// Avatar to capture when drawing, if the layout shows one.
    pub fn avatar_url(&self) -> Option<&Url> {
        match &self.profile {
            ProfileBlock::Profile { avatar_url, .. } => avatar_url.as_ref(),
            _ => None,
        }
    }

    /// The layout as a standalone SVG document. `avatar_png` is embedded
    /// in place of the avatar when given, otherwise a grey disc is drawn.
    pub fn to_svg(&self, avatar_png: Option<&[u8]>) -> String {
        let mut svg = Svg::new();
        svg.raw(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
             xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
             width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = CANVAS_WIDTH,
            h = CANVAS_HEIGHT
        ));
        svg.raw(&format!(
            "<rect x=\"{o}\" y=\"{o}\" width=\"{w}\" height=\"{h}\" \
             rx=\"12\" fill=\"#ffffff\" stroke=\"{BLUE_600}\" \
             stroke-width=\"{BORDER}\"/>",
            o = BORDER / 2.0,
            w = CANVAS_WIDTH as f32 - BORDER,
            h = CANVAS_HEIGHT as f32 - BORDER,
        ));

        let mut y = BORDER + PADDING;
        svg.centered(y + 27.0, TITLE, &self.title);
        y += 36.0 + 8.0;
        svg.centered(y + 20.0, LEAD, &self.presented_to);
        y += 28.0;

        match &self.profile {
            ProfileBlock::Empty => {}
            ProfileBlock::Fetching(message) => {
                y += 16.0;
                svg.centered(y + 17.0, NOTICE, message);
                y += 24.0;
            }
            ProfileBlock::Failed(message) => {
                y += 16.0;
                svg.centered(y + 17.0, ERROR, message);
                y += 24.0;
            }
            ProfileBlock::Profile {
                display_name,
                handle,
                profile_url,
                ..
            } => {
                y += 16.0;
                svg.avatar(y, avatar_png, profile_url.as_ref());
                y += AVATAR_SIZE as f32 + 8.0;
                svg.centered(y + 23.0, NAME, display_name);
                y += 32.0;
                svg.centered(y + 17.0, HANDLE, handle);
                y += 24.0;
            }
        }

        y += 16.0;
        for line in wrap(&self.appreciation, APPRECIATION_COLUMNS) {
            svg.centered(y + 20.0, LEAD, &line);
            y += 28.0;
        }

        y += 32.0;
        let (left, right) = (FOOTER_INSET, CANVAS_WIDTH as f32 - FOOTER_INSET);
        let baseline = y + 15.0;
        let label = FOOTER_LABEL;
        svg.text(left, baseline, label, Anchor::Start, &self.issuer_label);
        svg.text(right, baseline, label, Anchor::End, &self.date_label);
        let baseline = baseline + 20.0;
        svg.text(left, baseline, FOOTER, Anchor::Start, &self.issuer_name);
        svg.text(right, baseline, FOOTER, Anchor::End, &self.date);

        svg.raw("</svg>");
        svg.finish()
    }
}

impl fmt::Display for CertificateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.presented_to)?;
        writeln!(f)?;
        match &self.profile {
            ProfileBlock::Empty => {}
            ProfileBlock::Fetching(message) | ProfileBlock::Failed(message) => {
                writeln!(f, "  {}", message)?;
                writeln!(f)?;
            }
            ProfileBlock::Profile {
                display_name,
                handle,
                profile_url,
                ..
            } => {
                writeln!(f, "  {}", display_name)?;
                writeln!(f, "  {}", handle)?;
                if let Some(url) = profile_url {
                    writeln!(f, "  {}", url)?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "{}", self.appreciation)?;
        writeln!(f)?;
        writeln!(f, "{}: {}", self.issuer_label, self.issuer_name)?;
        write!(f, "{}: {}", self.date_label, self.date)
    }
}

/// Falls back to ISO 8601 when the pattern cannot be rendered.
fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", date.format(pattern)) {
        Ok(()) => out,
        Err(_) => date.format("%Y-%m-%d").to_string(),
    }
}

/// Greedy word wrap on character count.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > columns && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

struct Svg {
    out: String,
}

impl Svg {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn raw(&mut self, markup: &str) {
        self.out.push_str(markup);
        self.out.push('\n');
    }

    fn centered(&mut self, baseline: f32, style: Style, content: &str) {
        self.text(CENTER_X, baseline, style, Anchor::Middle, content);
    }

    fn text(
        &mut self,
        x: f32,
        baseline: f32,
        style: Style,
        anchor: Anchor,
        content: &str,
    ) {
        let weight = if style.bold { "bold" } else { "normal" };
        self.raw(&format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" \
             font-weight=\"{}\" fill=\"{}\" text-anchor=\"{}\">{}</text>",
            x,
            baseline,
            FONT_FAMILY,
            style.size,
            weight,
            style.fill,
            anchor.as_str(),
            escape(content)
        ));
    }

    fn avatar(&mut self, top: f32, png: Option<&[u8]>, link: Option<&Url>) {
        let size = AVATAR_SIZE as f32;
        let radius = size / 2.0;
        let left = CENTER_X - radius;
        let cy = top + radius;

        if let Some(url) = link {
            self.raw(&format!("<a xlink:href=\"{}\">", escape(url.as_str())));
        }
        match png {
            Some(bytes) => {
                self.raw(&format!(
                    "<defs><clipPath id=\"avatar-clip\"><circle cx=\"{}\" \
                     cy=\"{}\" r=\"{}\"/></clipPath></defs>",
                    CENTER_X, cy, radius
                ));
                self.raw(&format!(
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" \
                     preserveAspectRatio=\"xMidYMid slice\" \
                     clip-path=\"url(#avatar-clip)\" \
                     xlink:href=\"data:image/png;base64,{}\"/>",
                    left,
                    top,
                    size,
                    size,
                    STANDARD.encode(bytes)
                ));
            }
            None => self.raw(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
                CENTER_X, cy, radius, GRAY_200
            )),
        }
        self.raw(&format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" \
             stroke=\"{}\" stroke-width=\"{}\"/>",
            CENTER_X,
            cy,
            radius - BORDER / 2.0,
            BLUE_500,
            BORDER
        ));
        if link.is_some() {
            self.raw("</a>");
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::profile::ProfileRecord;
    use rstest::rstest;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn view_of(state: &ProfileState) -> CertificateView {
        CertificateView::build(state, &Template::default(), today())
    }

    fn settled(identifier: &str, record: ProfileRecord) -> ProfileState {
        let mut state = ProfileState::default();
        let ticket = state.load_start(identifier);
        state.load_success(ticket, record);
        state
    }

    fn octocat() -> ProfileState {
        settled(
            "octocat",
            ProfileRecord::new(json!({
                "name": "The Octocat",
                "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
                "html_url": "https://github.com/octocat",
            })),
        )
    }

    #[test]
    fn shows_profile_when_loaded() {
        let view = view_of(&octocat());

        match &view.profile {
            ProfileBlock::Profile {
                display_name,
                handle,
                avatar_url,
                profile_url,
            } => {
                assert_eq!(display_name, "The Octocat");
                assert_eq!(handle, "@octocat");
                assert!(avatar_url.is_some());
                assert_eq!(
                    profile_url.as_ref().map(Url::as_str),
                    Some("https://github.com/octocat")
                );
            }
            other => panic!("unexpected block: {other:?}"),
        }
        assert_eq!(view.date, "10/19/2026");
        assert_eq!(view.identifier, "octocat");
    }

    #[test]
    fn name_falls_back_to_identifier() {
        let record = ProfileRecord::new(json!({"login": "ghost"}));
        let view = view_of(&settled("ghost", record));

        assert_eq!(
            view.profile,
            ProfileBlock::Profile {
                display_name: "ghost".to_owned(),
                handle: "@ghost".to_owned(),
                avatar_url: None,
                profile_url: None,
            }
        );
        assert_eq!(view.avatar_url(), None);
    }

    #[test]
    fn loading_and_errors_replace_the_profile() {
        let mut state = ProfileState::default();
        let ticket = state.load_start("octocat");
        let view = view_of(&state);
        assert_eq!(
            view.profile,
            ProfileBlock::Fetching("Fetching GitHub Profile...".to_owned())
        );

        state.load_error(ticket, &FetchError::NotFound);
        let view = view_of(&state);
        assert_eq!(
            view.profile,
            ProfileBlock::Failed("GitHub profile not found".to_owned())
        );
        assert!(view.to_string().contains("GitHub profile not found"));

        let view = CertificateView::build(
            &ProfileState::default(),
            &Template::default(),
            today(),
        );
        assert_eq!(view.profile, ProfileBlock::Empty);
    }

    #[test]
    fn rebuilding_is_stable() {
        let state = octocat();
        let a = CertificateView::build(&state, &Template::default(), today());
        let b = CertificateView::build(&state, &Template::default(), today());
        assert_eq!(a, b);
        assert_eq!(a.to_svg(None), b.to_svg(None));
    }

    #[test]
    fn date_reflects_render_day() {
        let state = octocat();
        let template = Template::default();
        let monday = CertificateView::build(&state, &template, today());
        let tuesday = CertificateView::build(
            &state,
            &template,
            today().succ_opt().unwrap(),
        );
        assert_eq!(monday.date, "10/19/2026");
        assert_eq!(tuesday.date, "10/20/2026");
    }

    #[rstest]
    #[case("%Y-%m-%d", "2026-10-19")]
    #[case("%d.%m.%Y", "19.10.2026")]
    #[case("%B %-d, %Y", "October 19, 2026")]
    #[case("%Q", "2026-10-19")]
    fn formats_dates(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(format_date(today(), pattern), expected);
    }

    #[test]
    fn svg_escapes_text() {
        let state = settled(
            "mallory",
            ProfileRecord::new(json!({"name": "<script>&\"'"})),
        );
        let svg = CertificateView::build(&state, &Template::default(), today())
            .to_svg(None);

        assert!(svg.contains("&lt;script&gt;&amp;&quot;&apos;"));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn svg_embeds_avatar_and_link() {
        let view = view_of(&octocat());

        let with = view.to_svg(Some(&[1, 2, 3]));
        assert!(with.contains("data:image/png;base64,AQID"));
        assert!(with.contains("xlink:href=\"https://github.com/octocat\""));
        assert!(with.contains("@octocat"));

        let without = view.to_svg(None);
        assert!(!without.contains("data:image/png"));
        assert!(without.contains(GRAY_200));
    }

    #[test]
    fn text_view_lists_every_part() {
        let text = view_of(&octocat()).to_string();

        assert!(text.starts_with("Certificate of Appreciation\n"));
        assert!(text.contains("  The Octocat\n  @octocat\n"));
        assert!(text.contains("Project Team: [Your Project Name]"));
        assert!(text.ends_with("Date: 10/19/2026"));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let appreciation = Template::default().appreciation;
        let lines = wrap(&appreciation, APPRECIATION_COLUMNS);
        assert_eq!(
            lines,
            vec![
                "For valuable contributions to the project and the".to_owned(),
                "open-source community.".to_owned(),
            ]
        );
        assert!(wrap("", 10).is_empty());
        assert_eq!(
            wrap("averyveryverylongword x", 5),
            vec!["averyveryverylongword", "x"]
        );
    }
}
