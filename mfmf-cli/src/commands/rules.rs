//! `mfmf --list-rules` handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use mfmf_log_filter::rule::{LineRule, Rule, RuleMeta, RuleSet};
use mfmf_log_filter::{Scanner, ScannerConfig};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Load and compile all three rule files and print them.
pub fn execute(config: ScannerConfig, writer: &OutputWriter) -> Result<(), CliError> {
    info!(rule_dir = %config.rule_dir.display(), "listing rules");

    let scanner = Scanner::load(config)?;
    let report = RuleListReport::from_scanner(&scanner);
    writer.render(&report)?;

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RuleListReport {
    pub rule_dir: String,
    pub exec_script: bool,
    pub predicate_mode: String,
    pub block_list: RuleGroup,
    pub allow_list: RuleGroup,
    pub patterns: RuleGroup,
}

#[derive(Debug, Serialize)]
pub struct RuleGroup {
    pub file: String,
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Serialize)]
pub struct RuleEntry {
    /// Position in the compiled set (the `matched_rule_index` of records).
    pub index: usize,
    /// 0-based data row in the source file.
    pub ordinal: usize,
    pub name: String,
    pub pattern: String,
    pub case_sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

impl RuleListReport {
    pub fn from_scanner(scanner: &Scanner) -> Self {
        let config = scanner.config();
        Self {
            rule_dir: config.rule_dir.display().to_string(),
            exec_script: config.exec_script,
            predicate_mode: config.predicate.mode.to_string(),
            block_list: RuleGroup::basename(
                config.block_path().display().to_string(),
                scanner.block_list().rules(),
            ),
            allow_list: RuleGroup::basename(
                config.allow_path().display().to_string(),
                scanner.allow_list().rules(),
            ),
            patterns: RuleGroup::lines(
                config.pattern_path().display().to_string(),
                scanner.line_matcher().rules(),
            ),
        }
    }
}

impl RuleGroup {
    fn basename<R: Rule>(file: String, set: &RuleSet<R>) -> Self {
        let rules = set
            .iter()
            .enumerate()
            .map(|(index, compiled)| RuleEntry::new(index, compiled.rule.meta(), None))
            .collect();
        Self { file, rules }
    }

    fn lines(file: String, set: &RuleSet<LineRule>) -> Self {
        let rules = set
            .iter()
            .enumerate()
            .map(|(index, compiled)| {
                let rule = &compiled.rule;
                let predicate = rule
                    .predicate_enabled
                    .then(|| rule.predicate_source.clone());
                RuleEntry::new(index, &rule.meta, predicate)
            })
            .collect();
        Self { file, rules }
    }

    fn render_text(&self, w: &mut dyn Write, title: &str) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{} ({} rules) {}",
            title.bold(),
            self.rules.len(),
            self.file.dimmed()
        )?;
        if self.rules.is_empty() {
            writeln!(w, "  (none)")?;
            return Ok(());
        }

        writeln!(
            w,
            "  {:<6} {:<6} {:<24} {:<6} Pattern",
            "Index", "Row", "Name", "Case"
        )?;
        writeln!(w, "  {}", "-".repeat(70))?;
        for r in &self.rules {
            let case = if r.case_sensitive {
                "yes".normal()
            } else {
                "no".yellow()
            };
            let name = if r.name.is_empty() {
                format!("#{}", r.ordinal)
            } else {
                r.name.clone()
            };
            writeln!(
                w,
                "  {:<6} {:<6} {:<24} {:<6} {}",
                r.index, r.ordinal, name, case, r.pattern
            )?;
            if let Some(predicate) = &r.predicate {
                writeln!(w, "  {:<6} {} {}", "", "predicate:".cyan(), predicate)?;
            }
        }
        Ok(())
    }
}

impl RuleEntry {
    fn new(index: usize, meta: &RuleMeta, predicate: Option<String>) -> Self {
        Self {
            index,
            ordinal: meta.ordinal,
            name: meta.name.clone(),
            pattern: meta.pattern.clone(),
            case_sensitive: meta.case_sensitive,
            predicate,
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule directory: {}", self.rule_dir.bold())?;
        let exec = if self.exec_script {
            "enabled".red()
        } else {
            "disabled".green()
        };
        writeln!(
            w,
            "Predicate execution: {} (mode: {})",
            exec, self.predicate_mode
        )?;
        writeln!(w)?;

        self.block_list.render_text(w, "Block list")?;
        writeln!(w)?;
        self.allow_list.render_text(w, "Allow list")?;
        writeln!(w)?;
        self.patterns.render_text(w, "Line patterns")?;

        Ok(())
    }
}
