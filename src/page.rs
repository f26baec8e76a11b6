//! The XHTML page skeleton wrapped around compiled page contents.

use wikimark::{HrefStyle, WikiName};

const DOCTYPE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\"\n    \
                       \"http://www.w3.org/TR/2002/REC-xhtml1-20020801/DTD/xhtml1-strict.dtd\">";

const STYLE: &str = "#header {border-bottom-width: 2px; border-bottom-style: groove;}\n\
                     #footer {border-top-width: 2px; border-top-style: groove; clear:both;}\n\
                     a.nonexistent {text-decoration: none;}";

/// Everything a page needs besides its contents.
pub struct PageFrame<'a> {
    pub site_title: &'a str,
    pub hrefs: &'a HrefStyle,
    /// Front page and auto pages, linked from every footer.
    pub site_pages: &'a [WikiName],
}

impl PageFrame<'_> {
    pub fn render(&self, page: &WikiName, contents: &str) -> String {
        let title = page.title();
        let site_title = html_escape::encode_text(self.site_title);
        let footer_links = self
            .site_pages
            .iter()
            .filter(|name| *name != page)
            .map(|name| {
                format!(
                    "<a href=\"{}\">{}</a>",
                    html_escape::encode_double_quoted_attribute(&self.hrefs.goto_href(name)),
                    name.title()
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");

        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             {DOCTYPE}\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n\
             <head>\n\
             <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n\
             <title>{title} - {site_title}</title>\n\
             <style type=\"text/css\">\n{STYLE}\n</style>\n\
             </head>\n\
             <body>\n\
             <div id=\"header\"><h1>{title}</h1></div>\n\
             <div id=\"contents\">{contents}\n</div>\n\
             <div id=\"footer\">{footer_links}<p id=\"credit\">Built with wikimark {version}</p></div>\n\
             </body>\n\
             </html>\n",
            version = env!("CARGO_PKG_VERSION"),
        )
    }
}
