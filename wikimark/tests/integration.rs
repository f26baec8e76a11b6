//! End-to-end compiles of whole pages through the public API.

use pretty_assertions::assert_eq;
use wikimark::{
    Compiler, MacroRegistry, Options, PageIndex, PageOracle, Resolution, Severity, WikiName,
};

fn plain() -> Options {
    Options {
        no_follow_outlinks: false,
        numbered_outlinks: false,
    }
}

fn names(list: &[&str]) -> Vec<WikiName> {
    list.iter()
        .map(|s| WikiName::parse(s).unwrap_or_else(|| panic!("bad name {s}")))
        .collect()
}

/// Every opening tag in `html` is closed in matching order.
fn assert_balanced(html: &str) {
    let mut open: Vec<String> = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start + 1..start + len];
        rest = &rest[start + len + 1..];
        if tag.starts_with('!') || tag.ends_with('/') {
            continue;
        }
        let name = tag.split_whitespace().next().unwrap_or_default();
        if let Some(closing) = name.strip_prefix('/') {
            assert_eq!(open.pop().as_deref(), Some(closing), "in {html}");
        } else {
            open.push(name.to_string());
        }
    }
    assert!(open.is_empty(), "unclosed {open:?} in {html}");
}

const SAMPLE_PAGE: &str = "\
__Welcome__

Start at FrontPage or read the ''guide'' at http://example.org/guide.

 * first item with '''bold'''
 * second item
  # nested ordered
  # another
 * back out
----
  A quote that mentions NewIdea.
{{
 * literal, not a list
__not a heading__
}}
\\\\
|www.example.org/logo.png| done.";

#[test]
fn sample_page_compiles_balanced() {
    let index = PageIndex::new().with_existing(names(&["FrontPage"]));
    let result = Compiler::new(Options::default())
        .with_oracle(&index)
        .compile_with_diagnostics(SAMPLE_PAGE);

    assert_balanced(&result.html);
    assert!(result.html.starts_with("\n<h1>Welcome</h1>"), "{}", result.html);
    assert!(result.html.contains("<hr />"));
    assert!(result.html.contains("<ol>"));
    assert!(result.html.contains(" * literal, not a list\n__not a heading__\n</pre>"));
    assert!(result.html.contains("<p style=\"clear:both;\"></p><div style=\"text-align:center;\">"));
    assert!(!result.diagnostics.iter().any(|d| d.severity == Severity::Error));
    let info: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Info)
        .map(|d| d.line)
        .collect();
    assert_eq!(info, vec![11]);
}

#[test]
fn list_depth_closes_exactly_one_nested_list() {
    let html = wikimark::compile(" * a\n  * b\n * c", &plain());
    assert_balanced(&html);
    assert_eq!(html.matches("<ul>").count(), 2);
    assert_eq!(html.matches("</ul>").count(), 2);
    assert!(html.ends_with("<li> c</li></ul>"), "{html}");
}

#[test]
fn emphasis_interleave() {
    assert_eq!(
        wikimark::compile("''a'''b'''c''", &plain()),
        "\n<p><em>a<strong>b</strong>c</em></p>"
    );
}

#[test]
fn link_resolution() {
    let index = PageIndex::new()
        .with_existing(names(&["FrontPage"]))
        .with_auto(names(&["AutoIndex"]));
    let html = Compiler::new(plain())
        .with_oracle(&index)
        .compile("FrontPage NoSuchPage AutoIndex");

    let wikilink = html.match_indices("class=\"wikilink\"").map(|(i, _)| i).collect::<Vec<_>>();
    let missing = html.find("NoSuchPage<a class=\"nonexistent\"").unwrap();
    assert_eq!(wikilink.len(), 2);
    assert!(wikilink[0] < missing && missing < wikilink[1], "{html}");
}

#[test]
fn numbering_resets_per_compile() {
    let options = Options {
        no_follow_outlinks: true,
        numbered_outlinks: true,
    };
    let compiler = Compiler::new(options);
    for _ in 0..2 {
        let html = compiler.compile("http://a.org\nhttp://b.org\nwww.c.org");
        assert!(html.contains(">[1]</a>") && html.contains(">[3]</a>"), "{html}");
        assert!(!html.contains("[4]"));
        assert_eq!(html.matches("rel=\"nofollow\"").count(), 3);
    }
}

#[test]
fn pre_block_is_literal() {
    let html = wikimark::compile("{{\n * x\n----\n__H__\n}}", &plain());
    assert_eq!(html, "\n<p></p><pre>\n * x\n----\n__H__\n</pre><p></p>");
}

#[test]
fn input_markup_is_neutralized() {
    let html = wikimark::compile("<script>alert(\"x\")</script>", &plain());
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
}

struct DelegatingOracle {
    index: PageIndex,
}

impl PageOracle for DelegatingOracle {
    fn resolve(&self, name: &WikiName) -> Result<Resolution, wikimark::OracleError> {
        self.index.resolve(name)
    }
}

#[test]
fn custom_oracle_and_macros_together() {
    let oracle = DelegatingOracle {
        index: PageIndex::new().with_existing(names(&["HomePage"])),
    };
    let mut macros = MacroRegistry::new();
    macros.register("Now", |_| Ok("<span>today</span>".to_string()));

    let compiler = Compiler::new(plain()).with_oracle(&oracle).with_macros(&macros);
    let html = compiler.compile("[[Now]]\nSee HomePage on [[Now]].");
    assert_eq!(
        html,
        "<span>today</span>\n<p>See <a class=\"wikilink\" href=\"HomePage.html\">Home Page</a> \
         on <span>today</span>.</p>"
    );
}

#[test]
fn diagnostics_carry_lines() {
    let result = Compiler::new(plain()).compile_with_diagnostics("ok\n___Odd___\n}}\n[[x--y]]");
    let found: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| (d.line, d.code.clone().unwrap_or_default()))
        .collect();
    assert_eq!(
        found,
        vec![
            (2, "W005".to_string()),
            (3, "W006".to_string()),
            (4, "W003".to_string()),
            (4, "W004".to_string()),
        ]
    );
}
