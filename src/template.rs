//! Page templating.
//!
//! Templates are tera templates receiving two variables: `title`, already
//! HTML-escaped, and `body`, a sanitized fragment inserted as-is. Autoescaping
//! is turned off so that a user template does not need `| safe` on the body.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::PreviewError;
use crate::render::SafeHtml;

/// Title given to every preview page.
pub const DEFAULT_TITLE: &str = "Markdown Preview Tool";

/// Template used when no alternate template file is supplied.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta http-equiv="content-type" content="text/html; charset=utf-8">
<title>{{ title }}</title>
</head>
<body>
{{ body }}
</body>
</html>
	"#;

const HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta http-equiv="content-type" content="text/html; charset=utf-8">
<title>Markdown Preview Tool</title>
</head>
<body>
"#;

const FOOTER: &str = "
</body>
</html>
";

const DEFAULT_TEMPLATE_NAME: &str = "mdp";

/// What gets substituted into a page template.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub title: String,
    pub body: SafeHtml,
}

impl PageContent {
    pub fn new(body: SafeHtml) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body,
        }
    }
}

#[derive(Serialize)]
struct TemplateVars<'a> {
    title: String,
    body: &'a SafeHtml,
}

/// A parsed page template, either the built-in one or a user-supplied file.
pub struct PageTemplate {
    tera: Tera,
    name: String,
}

impl PageTemplate {
    /// Parses the built-in template.
    pub fn builtin() -> Result<Self, PreviewError> {
        Self::from_source(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE).map_err(|source| {
            PreviewError::TemplateLoad {
                path: DEFAULT_TEMPLATE_NAME.into(),
                source: source.into(),
            }
        })
    }

    /// Reads and parses a template file. There is no fallback: a missing or
    /// malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, PreviewError> {
        let source = fs::read_to_string(path).map_err(|source| PreviewError::TemplateLoad {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string());

        Self::from_source(&name, &source).map_err(|source| PreviewError::TemplateLoad {
            path: path.to_path_buf(),
            source: source.into(),
        })
    }

    /// Loads `path` when given, the built-in template otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, PreviewError> {
        match path {
            Some(path) => {
                debug!("Loading template from {}", path.display());
                Self::load(path)
            }
            None => Self::builtin(),
        }
    }

    fn from_source(name: &str, source: &str) -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_template(name, source)?;

        Ok(Self {
            tera,
            name: name.to_string(),
        })
    }

    /// Executes the template only, without the trailing static wrapper.
    pub fn execute(&self, page: &PageContent) -> Result<String, PreviewError> {
        let vars = TemplateVars {
            title: tera::escape_html(&page.title),
            body: &page.body,
        };

        let context = Context::from_serialize(&vars).map_err(|source| {
            PreviewError::TemplateExecution {
                name: self.name.clone(),
                source,
            }
        })?;

        self.tera
            .render(&self.name, &context)
            .map_err(|source| PreviewError::TemplateExecution {
                name: self.name.clone(),
                source,
            })
    }

    /// Builds the full page: the executed template followed by a static
    /// header, the body again, and a static footer.
    pub fn render_page(&self, page: &PageContent) -> Result<Vec<u8>, PreviewError> {
        let templated = self.execute(page)?;
        let body = page.body.as_str();

        let mut buffer =
            String::with_capacity(templated.len() + HEADER.len() + body.len() + FOOTER.len());
        buffer.push_str(&templated);
        buffer.push_str(HEADER);
        buffer.push_str(body);
        buffer.push_str(FOOTER);

        Ok(buffer.into_bytes())
    }
}

/// Wraps a sanitized fragment into a complete document, using the template at
/// `template` if one is given.
pub fn build_page(body: SafeHtml, template: Option<&Path>) -> Result<Vec<u8>, PreviewError> {
    let template = PageTemplate::resolve(template)?;
    template.render_page(&PageContent::new(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_safe;
    use assert_fs::prelude::*;

    #[test]
    fn default_template_wraps_body_twice() {
        let body = render_safe(b"# Title\n\nHello **world**");
        let page = String::from_utf8(build_page(body, None).unwrap()).unwrap();

        assert_eq!(page.matches("<h1>Title</h1>").count(), 2);
        assert_eq!(page.matches("<strong>world</strong>").count(), 2);
        assert_eq!(
            page.matches("<title>Markdown Preview Tool</title>").count(),
            2
        );
        assert_eq!(page.matches("<!DOCTYPE html>").count(), 2);
        assert!(page.ends_with("</body>\n</html>\n"));
        assert!(page.contains("</html>\n\t<!DOCTYPE html>"));
    }

    #[test]
    fn default_template_layout() {
        const HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta http-equiv=\"content-type\" content=\"text/html; charset=utf-8\">\n<title>Markdown Preview Tool</title>\n</head>\n<body>\n";

        let body = render_safe(b"Hello");
        let page = String::from_utf8(build_page(body, None).unwrap()).unwrap();

        let expected = format!("{HEAD}<p>Hello</p>\n\n</body>\n</html>\n\t{HEAD}<p>Hello</p>\n\n</body>\n</html>\n");
        assert_eq!(page, expected);
    }

    #[test]
    fn title_is_escaped_but_body_is_not() {
        let template = PageTemplate::builtin().unwrap();
        let page = PageContent {
            title: "<Notes & Todo>".to_string(),
            body: render_safe(b"*hi*"),
        };

        let html = template.execute(&page).unwrap();
        assert!(html.contains("<title>&lt;Notes &amp; Todo&gt;</title>"));
        assert!(html.contains("<p><em>hi</em></p>"));
    }

    #[test]
    fn custom_template_replaces_default() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("page.html");
        file.write_str("<main data-title=\"{{ title }}\">{{ body }}</main>\n")
            .unwrap();

        let page = build_page(render_safe(b"Hi"), Some(file.path())).unwrap();
        let page = String::from_utf8(page).unwrap();

        assert!(page.starts_with(
            "<main data-title=\"Markdown Preview Tool\"><p>Hi</p>\n</main>\n<!DOCTYPE html>"
        ));
        assert!(page.ends_with("<body>\n<p>Hi</p>\n\n</body>\n</html>\n"));
    }

    #[test]
    fn missing_template_is_a_load_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("nope.html");

        let err = build_page(render_safe(b"Hi"), Some(missing.path())).unwrap_err();
        assert!(matches!(err, PreviewError::TemplateLoad { .. }), "{err:?}");
    }

    #[test]
    fn malformed_template_is_a_load_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("broken.html");
        file.write_str("<p>{{ body </p>").unwrap();

        let err = PageTemplate::load(file.path()).err().unwrap();
        assert!(matches!(err, PreviewError::TemplateLoad { .. }), "{err:?}");
    }

    #[test]
    fn unknown_variable_is_an_execution_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("vars.html");
        file.write_str("{{ author }}").unwrap();

        let template = PageTemplate::load(file.path()).unwrap();
        let err = template
            .execute(&PageContent::new(render_safe(b"x")))
            .unwrap_err();
        assert!(
            matches!(err, PreviewError::TemplateExecution { .. }),
            "{err:?}"
        );
    }
}
