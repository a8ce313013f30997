// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::{GeometryStats, ProcessReport};
use crate::identity::Identifier;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Summary of a loaded mesh
    pub fn report_info(file: &str, stats: &GeometryStats, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Mesh:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_row("Vertices", stats.vertex_count.to_string().cyan());
        Self::print_row("Faces", stats.face_count.to_string().cyan());
        Self::print_row("Edges", stats.edge_count.to_string().cyan());
        Self::print_row("Bodies", stats.body_count.to_string().cyan());
        Self::print_row("Euler number", stats.euler_number.to_string().cyan());
        Self::print_row("Watertight", Self::flag(stats.is_watertight));
        Self::print_row("Consistent winding", Self::flag(stats.is_winding_consistent));
        if stats.boundary_edges > 0 || stats.non_manifold_edges > 0 {
            Self::print_row(
                "Open edges",
                format!(
                    "{} boundary, {} non-manifold",
                    stats.boundary_edges, stats.non_manifold_edges
                )
                .yellow(),
            );
        }

        println!("\n{}", "Mass properties:".bold());
        let volume = format!("{:.6}", stats.volume);
        Self::print_row(
            "Volume",
            if stats.is_reliable {
                volume.green()
            } else {
                format!("{} (unreliable)", volume).yellow()
            },
        );
        Self::print_row("Surface area", format!("{:.6}", stats.surface_area).cyan());
        Self::print_row(
            "Center of mass",
            Self::triple(&stats.center_mass).cyan(),
        );
        Self::print_row(
            "Principal inertia",
            Self::triple(&stats.principal_inertia).cyan(),
        );
        Self::print_row(
            "Bounds",
            format!(
                "{} .. {}",
                Self::triple(&[stats.bbox[0], stats.bbox[1], stats.bbox[2]]),
                Self::triple(&[stats.bbox[3], stats.bbox[4], stats.bbox[5]])
            )
            .cyan(),
        );

        println!("\n{}", "Performance:".bold());
        Self::print_row("Time", Self::format_duration(duration).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// What a repair run changed
    pub fn report_process(file: &str, report: &ProcessReport) {
        println!("{} {}", "Repaired:".bold(), file.cyan());
        Self::print_count("Merged vertices", report.merged_vertices);
        Self::print_count("Duplicate faces", report.duplicate_faces);
        Self::print_count("Degenerate faces", report.degenerate_faces);
        Self::print_count("Unreferenced vertices", report.unreferenced_vertices);
        if let Some(normals) = &report.normals {
            Self::print_count("Flipped faces", normals.flipped_faces);
            Self::print_count("Inverted bodies", normals.inverted_components);
        }
        if let Some(holes) = &report.holes {
            Self::print_count("Filled holes", holes.filled);
            if !holes.unresolved.is_empty() {
                Self::report_warning(&format!(
                    "{} holes could not be filled",
                    holes.unresolved.len()
                ));
            }
        }
    }

    pub fn report_identifier(file: &str, identifier: &Identifier) {
        println!("{}  {}", identifier.digest().bright_black(), file.cyan());
    }

    /// Groups of files that share an identifier
    pub fn report_duplicates(groups: &[Vec<&Path>]) {
        let duplicated: Vec<&Vec<&Path>> = groups.iter().filter(|g| g.len() > 1).collect();
        if duplicated.is_empty() {
            Self::success(&format!("{} meshes, no duplicates", groups.len()));
            return;
        }

        for group in &duplicated {
            println!("\n{} {}", "Kept:".bold(), group[0].display().to_string().cyan());
            for path in &group[1..] {
                println!("  {} {}", "duplicate".yellow(), path.display());
            }
        }
        let extra: usize = duplicated.iter().map(|g| g.len() - 1).sum();
        println!(
            "\n{} {} unique, {} duplicates",
            "Summary:".bold(),
            groups.len().to_string().green(),
            extra.to_string().yellow()
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn flag(value: bool) -> ColoredString {
        if value {
            "yes".green()
        } else {
            "no".red()
        }
    }

    fn triple(values: &[f64; 3]) -> String {
        format!("({:.4}, {:.4}, {:.4})", values[0], values[1], values[2])
    }

    fn print_row(name: &str, value: ColoredString) {
        println!("  {:<20} {}", format!("{}:", name).bright_black(), value);
    }

    fn print_count(name: &str, count: usize) {
        let value = if count == 0 {
            count.to_string().bright_black()
        } else {
            count.to_string().yellow()
        };
        Self::print_row(name, value);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
