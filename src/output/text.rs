//! Human-readable report for the terminal.

use std::fmt::Display;
use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Color, Condition, Painted};

use super::ScanReport;
use crate::duplicates::GroupKind;

/// Characters of an exact digest shown in the group header.
const SHORT_HASH_LEN: usize = 12;

/// Plain-text renderer with optional ANSI colors.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    color: Condition,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer; `color` enables ANSI styling.
    #[must_use]
    pub fn new(report: &'a ScanReport, color: bool) -> Self {
        Self {
            report,
            color: if color { Condition::ALWAYS } else { Condition::NEVER },
        }
    }

    fn paint<T: Display>(&self, value: T, color: Color) -> Painted<T> {
        Painted::new(value).fg(color).whenever(self.color)
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        self.write_groups(&mut w)?;
        self.write_categories(&mut w)?;
        self.write_empty_folders(&mut w)?;
        self.write_summary(&mut w)
    }

    fn write_groups<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let groups = &self.report.groups;
        if groups.is_empty() {
            writeln!(w, "{}", self.paint("No duplicates found.", Color::Green))?;
            return writeln!(w);
        }

        writeln!(
            w,
            "{}",
            self.paint(format!("Duplicate groups ({})", groups.len()), Color::Cyan)
                .bold()
        )?;
        for (idx, group) in groups.iter().enumerate() {
            let label = match group.kind {
                GroupKind::Exact => {
                    let short: String = group.key.chars().take(SHORT_HASH_LEN).collect();
                    format!("exact {short}")
                }
                GroupKind::Similar => "similar".to_string(),
            };
            writeln!(
                w,
                "\nGroup {} [{}] {} files, {} reclaimable",
                idx + 1,
                self.paint(label, Color::Yellow),
                group.len(),
                self.paint(ByteSize(group.wasted_space()), Color::Red),
            )?;
            for (pos, file) in group.files.iter().enumerate() {
                let marker = if pos == 0 { "*" } else { " " };
                writeln!(
                    w,
                    "  {marker} {} ({})",
                    file.path.display(),
                    ByteSize(file.size_bytes)
                )?;
            }
        }
        writeln!(w)
    }

    fn write_categories<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let categories = self.report.sorted_categories();
        if categories.is_empty() {
            return Ok(());
        }

        writeln!(w, "{}", self.paint("Categories", Color::Cyan).bold())?;
        for (name, paths) in categories {
            writeln!(w, "  {} ({})", self.paint(name, Color::Magenta), paths.len())?;
            for path in paths {
                writeln!(w, "    {path}")?;
            }
        }
        writeln!(w)
    }

    fn write_empty_folders<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let folders = &self.report.empty_folders;
        if folders.is_empty() {
            return Ok(());
        }

        writeln!(
            w,
            "{}",
            self.paint(format!("Empty folders ({})", folders.len()), Color::Cyan)
                .bold()
        )?;
        for folder in folders {
            writeln!(w, "  {}", folder.display())?;
        }
        writeln!(w)
    }

    fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let summary = &self.report.summary;
        writeln!(w, "{}", self.paint("Summary", Color::Cyan).bold())?;
        writeln!(
            w,
            "  Files scanned:    {} ({})",
            summary.total_files,
            summary.total_size_display()
        )?;
        writeln!(w, "  Duplicate groups: {}", summary.duplicate_groups)?;
        writeln!(w, "  Duplicate files:  {}", summary.duplicate_files)?;
        writeln!(
            w,
            "  Reclaimable:      {} ({:.1}%)",
            self.paint(summary.reclaimable_display(), Color::Green),
            summary.wasted_percentage()
        )?;
        if summary.error_count() > 0 {
            writeln!(
                w,
                "  Errors:           {}",
                self.paint(summary.error_count(), Color::Red)
            )?;
        }
        writeln!(
            w,
            "  Duration:         {:.2}s",
            summary.scan_duration.as_secs_f64()
        )?;
        if summary.interrupted {
            writeln!(w, "  {}", self.paint("Scan was interrupted", Color::Yellow))?;
        }
        Ok(())
    }
}
