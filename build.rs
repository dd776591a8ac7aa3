use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Directories whose Rust sources must follow the project's coding policy.
const SCANNED_DIRS: [&str; 3] = ["src", "tests", "benches"];

// A source rule enforced at build time: a line regex plus the text shown on failure.
struct Rule {
    pattern: &'static str,
    description: &'static str,
    remedy: &'static str,
    skip_comments_and_strings: bool,
}

const RULES: [Rule; 2] = [
    Rule {
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        description: "underscore-prefixed variables",
        remedy: "Either use the variable (removing the underscore) or remove it completely.",
        skip_comments_and_strings: true,
    },
    Rule {
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        description: "#[allow(dead_code)] attributes",
        remedy: "Either use the code (removing the attribute) or remove it completely.",
        skip_comments_and_strings: false,
    },
];

// A custom "Sink" for the grep searcher. It collects all matching lines
// from a single file to build a comprehensive error message.
struct ViolationCollector<'a> {
    rule: &'a Rule,
    violations: Vec<String>,
    file_path: PathBuf,
}

impl<'a> ViolationCollector<'a> {
    fn new(rule: &'a Rule, file_path: &Path) -> Self {
        Self {
            rule,
            violations: Vec::new(),
            file_path: file_path.to_path_buf(),
        }
    }

    fn check_and_get_error_message(&self) -> Option<String> {
        if self.violations.is_empty() {
            return None;
        }

        let file_name = self.file_path.to_str().unwrap_or("?");
        let mut error_msg = format!(
            "\n❌ ERROR: Found {} {} in {}:\n",
            self.violations.len(),
            self.rule.description,
            file_name
        );

        for violation in &self.violations {
            error_msg.push_str(&format!("   {violation}\n"));
        }

        error_msg.push_str(&format!(
            "\n⚠️ {} are STRICTLY FORBIDDEN in this project.\n",
            self.rule.description
        ));
        error_msg.push_str(&format!("   {}\n", self.rule.remedy));

        Some(error_msg)
    }
}

impl Sink for ViolationCollector<'_> {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line_text = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();

        if self.rule.skip_comments_and_strings {
            let is_pure_comment = line_text.trim_start().starts_with("//");

            // Odd-numbered segments between double quotes are string contents.
            let is_in_string = line_text
                .split('"')
                .enumerate()
                .any(|(i, part)| i % 2 == 1 && part.contains('_'));

            if is_pure_comment || is_in_string {
                return Ok(true);
            }
        }

        self.violations.push(format!("{line_number}:{line_text}"));
        Ok(true)
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SCANNED_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    for rule in &RULES {
        if let Err(e) = scan_sources(rule) {
            // `eprintln!` is what surfaces the message in cargo's output.
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn scan_sources(rule: &Rule) -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new_line_matcher(rule.pattern)?;
    let mut searcher = Searcher::new();

    for dir in SCANNED_DIRS {
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        {
            let path = entry.path();
            let mut collector = ViolationCollector::new(rule, path);
            searcher.search_path(&matcher, path, &mut collector)?;

            if let Some(error_message) = collector.check_and_get_error_message() {
                return Err(error_message.into());
            }
        }
    }

    Ok(())
}
