use crate::error::{GomajorError, Result};
use crate::golang::version::compare_versions;
use std::fs;
use std::path::Path;

/// Requirement-level edits on a dependency manifest
pub trait ManifestEditor {
    fn has_requirement(&self, path: &str) -> bool;
    fn drop_requirement(&mut self, path: &str) -> Result<()>;
    fn add_requirement(&mut self, path: &str, version: &str) -> Result<()>;
    fn cleanup_and_sort(&mut self);
    fn serialize(&self) -> Vec<u8>;
}

/// A `require` entry, either a single-line directive or a line in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Requirement {
    /// `"require "` for single-line directives, the indentation inside blocks.
    lead: String,
    path: String,
    quoted: bool,
    version: String,
    comment: Option<String>,
    /// Original text, kept until the entry is edited.
    raw: Option<String>,
}

impl Requirement {
    fn render(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }

        let path = if self.quoted {
            format!("\"{}\"", self.path)
        } else {
            self.path.clone()
        };
        match &self.comment {
            Some(comment) => format!("{}{} {} {}", self.lead, path, self.version, comment),
            None => format!("{}{} {}", self.lead, path, self.version),
        }
    }

    fn is_indirect(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.trim_start_matches("//").trim_start().starts_with("indirect"))
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
        if self.is_indirect() {
            self.comment = None;
        }
        self.raw = None;
    }
}

#[derive(Debug, Clone)]
enum BlockLine {
    Raw(String),
    Require(Requirement),
}

#[derive(Debug, Clone)]
struct Block {
    verb: String,
    open: String,
    lines: Vec<BlockLine>,
    close: String,
}

impl Block {
    fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.lines.iter().filter_map(|line| match line {
            BlockLine::Require(req) => Some(req),
            BlockLine::Raw(_) => None,
        })
    }

    fn has_raw_content(&self) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line, BlockLine::Raw(text) if !text.trim().is_empty()))
    }
}

#[derive(Debug, Clone)]
enum Stmt {
    Line(String),
    Require(Requirement),
    Block(Block),
}

/// In-memory go.mod that reproduces untouched lines verbatim.
#[derive(Debug, Clone)]
pub struct GoModFile {
    stmts: Vec<Stmt>,
}

impl GoModFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GomajorError::ManifestParsing(format!(
                "Error reading module file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| match e {
            GomajorError::ManifestParsing(msg) => GomajorError::ManifestParsing(format!(
                "Error parsing module file {}: {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut stmts = Vec::new();
        let mut open_block: Option<Block> = None;

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let (code, comment) = split_comment(line);
            let code = code.trim();

            if let Some(block) = open_block.as_mut() {
                if code == ")" {
                    block.close = line.to_string();
                    if let Some(block) = open_block.take() {
                        stmts.push(Stmt::Block(block));
                    }
                } else if block.verb == "require" && !code.is_empty() {
                    let lead = leading_whitespace(line);
                    let req = parse_requirement(code, lead, comment, line, line_no)?;
                    block.lines.push(BlockLine::Require(req));
                } else {
                    block.lines.push(BlockLine::Raw(line.to_string()));
                }
                continue;
            }

            let mut words = code.split_whitespace();
            let verb = words.next().unwrap_or_default();
            let rest = code[verb.len()..].trim();

            if !verb.is_empty() && rest == "(" {
                open_block = Some(Block {
                    verb: verb.to_string(),
                    open: line.to_string(),
                    lines: Vec::new(),
                    close: String::new(),
                });
            } else if verb == "require" {
                let req = parse_requirement(rest, "require ", comment, line, line_no)?;
                stmts.push(Stmt::Require(req));
            } else {
                stmts.push(Stmt::Line(line.to_string()));
            }
        }

        if let Some(block) = open_block {
            return Err(GomajorError::ManifestParsing(format!(
                "unterminated '{}' block",
                block.verb
            )));
        }

        Ok(Self { stmts })
    }

    /// Path declared by the `module` directive, if any.
    pub fn module_path(&self) -> Option<String> {
        self.stmts.iter().find_map(|stmt| match stmt {
            Stmt::Line(line) => {
                let (code, _) = split_comment(line);
                let mut words = code.split_whitespace();
                (words.next() == Some("module"))
                    .then(|| words.next().map(|p| p.trim_matches('"').to_string()))
                    .flatten()
            }
            _ => None,
        })
    }

    /// Version of the first requirement on `path`, if any.
    pub fn requirement_version(&self, path: &str) -> Option<String> {
        self.requirements()
            .into_iter()
            .find(|(p, _)| p == path)
            .map(|(_, version)| version)
    }

    /// `(path, version)` for every requirement, in file order.
    pub fn requirements(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for stmt in &self.stmts {
            match stmt {
                Stmt::Require(req) => out.push((req.path.clone(), req.version.clone())),
                Stmt::Block(block) => out.extend(
                    block
                        .requirements()
                        .map(|req| (req.path.clone(), req.version.clone())),
                ),
                Stmt::Line(_) => {}
            }
        }
        out
    }

    /// Index of the require block a new direct requirement belongs in: the
    /// last one holding a direct requirement, else the last one.
    fn target_block(&self) -> Option<usize> {
        let require_blocks: Vec<(usize, &Block)> = self
            .stmts
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| match stmt {
                Stmt::Block(block) if block.verb == "require" => Some((i, block)),
                _ => None,
            })
            .collect();

        require_blocks
            .iter()
            .rev()
            .find(|(_, block)| block.requirements().any(|req| !req.is_indirect()))
            .or_else(|| require_blocks.last())
            .map(|(i, _)| *i)
    }

    /// Re-adds a require block after cleanup: empty blocks vanish, a lone
    /// entry becomes a single-line directive, and the rest get sorted.
    fn push_require_block(&mut self, mut block: Block) {
        let count = block.requirements().count();
        if block.has_raw_content() || count > 1 {
            sort_requirement_runs(&mut block.lines);
            self.stmts.push(Stmt::Block(block));
            return;
        }

        if let Some(mut req) = block.requirements().next().cloned() {
            req.lead = "require ".to_string();
            req.raw = None;
            self.stmts.push(Stmt::Require(req));
        }
    }

    fn collapse_blank_lines(&mut self) {
        let mut previous_blank = false;
        self.stmts.retain(|stmt| {
            let blank = matches!(stmt, Stmt::Line(line) if line.trim().is_empty());
            let keep = !(blank && previous_blank);
            previous_blank = blank;
            keep
        });

        while matches!(self.stmts.last(), Some(Stmt::Line(line)) if line.trim().is_empty()) {
            self.stmts.pop();
        }
    }
}

impl ManifestEditor for GoModFile {
    fn has_requirement(&self, path: &str) -> bool {
        self.requirements().iter().any(|(p, _)| p == path)
    }

    fn drop_requirement(&mut self, path: &str) -> Result<()> {
        if !self.has_requirement(path) {
            return Err(GomajorError::NotADependency(path.to_string()));
        }

        self.stmts.retain(|stmt| !matches!(stmt, Stmt::Require(req) if req.path == path));
        for stmt in &mut self.stmts {
            if let Stmt::Block(block) = stmt {
                block
                    .lines
                    .retain(|line| !matches!(line, BlockLine::Require(req) if req.path == path));
            }
        }
        Ok(())
    }

    fn add_requirement(&mut self, path: &str, version: &str) -> Result<()> {
        if path.is_empty() || version.is_empty() {
            return Err(GomajorError::InvalidInput(format!(
                "Cannot add requirement '{path}' at version '{version}'"
            )));
        }

        if self.has_requirement(path) {
            for stmt in &mut self.stmts {
                match stmt {
                    Stmt::Require(req) if req.path == path => req.set_version(version),
                    Stmt::Block(block) => {
                        for line in &mut block.lines {
                            if let BlockLine::Require(req) = line {
                                if req.path == path {
                                    req.set_version(version);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            return Ok(());
        }

        let mut entry = Requirement {
            lead: "\t".to_string(),
            path: path.to_string(),
            quoted: false,
            version: version.to_string(),
            comment: None,
            raw: None,
        };

        if let Some(index) = self.target_block() {
            if let Stmt::Block(block) = &mut self.stmts[index] {
                let lead = block
                    .requirements()
                    .next()
                    .map(|req| req.lead.clone())
                    .unwrap_or_else(|| "\t".to_string());
                entry.lead = lead;
                block.lines.push(BlockLine::Require(entry));
            }
            return Ok(());
        }

        entry.lead = "require ".to_string();
        let last_single = self
            .stmts
            .iter()
            .rposition(|stmt| matches!(stmt, Stmt::Require(_)));
        match last_single {
            Some(index) => self.stmts.insert(index + 1, Stmt::Require(entry)),
            None => {
                if !matches!(self.stmts.last(), Some(Stmt::Line(line)) if line.trim().is_empty()) {
                    self.stmts.push(Stmt::Line(String::new()));
                }
                self.stmts.push(Stmt::Require(entry));
            }
        }
        Ok(())
    }

    fn cleanup_and_sort(&mut self) {
        let stmts = std::mem::take(&mut self.stmts);
        for stmt in stmts {
            match stmt {
                Stmt::Block(block) if block.verb == "require" => self.push_require_block(block),
                other => self.stmts.push(other),
            }
        }

        self.collapse_blank_lines();
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        for stmt in &self.stmts {
            match stmt {
                Stmt::Line(line) => out.push_str(line),
                Stmt::Require(req) => out.push_str(&req.render()),
                Stmt::Block(block) => {
                    out.push_str(&block.open);
                    out.push('\n');
                    for line in &block.lines {
                        match line {
                            BlockLine::Raw(text) => out.push_str(text),
                            BlockLine::Require(req) => out.push_str(&req.render()),
                        }
                        out.push('\n');
                    }
                    out.push_str(&block.close);
                }
            }
            out.push('\n');
        }
        out.into_bytes()
    }
}

/// Sorts each run of consecutive requirements by path, then version. Blank
/// and comment lines stay where they are and delimit the runs.
fn sort_requirement_runs(lines: &mut [BlockLine]) {
    for run in lines.split_mut(|line| matches!(line, BlockLine::Raw(_))) {
        run.sort_by(|a, b| match (a, b) {
            (BlockLine::Require(a), BlockLine::Require(b)) => a
                .path
                .cmp(&b.path)
                .then_with(|| compare_versions(&a.version, &b.version)),
            _ => std::cmp::Ordering::Equal,
        });
    }
}

fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find("//") {
        Some(pos) => (&line[..pos], Some(line[pos..].trim_end())),
        None => (line, None),
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn parse_requirement(
    code: &str,
    lead: &str,
    comment: Option<&str>,
    raw: &str,
    line_no: usize,
) -> Result<Requirement> {
    let words: Vec<&str> = code.split_whitespace().collect();
    let &[path, version] = words.as_slice() else {
        return Err(GomajorError::ManifestParsing(format!(
            "line {line_no}: expected 'path version' in require, found '{}'",
            code.trim()
        )));
    };

    let quoted = path.len() >= 2 && path.starts_with('"') && path.ends_with('"');
    let path = if quoted { &path[1..path.len() - 1] } else { path };

    Ok(Requirement {
        lead: lead.to_string(),
        path: path.to_string(),
        quoted,
        version: version.to_string(),
        comment: comment.map(str::to_string),
        raw: Some(raw.to_string()),
    })
}
