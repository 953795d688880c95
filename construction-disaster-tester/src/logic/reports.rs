use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use construction_disaster::numbers::ratio;

use super::sweep::{SweepResult, total_tally};

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[SweepResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Sweep Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "========================".cyan())?;

    let total_cases = results.len();
    let passed_cases = results.iter().filter(|r| r.passed).count();
    let failed_cases = total_cases - passed_cases;

    writeln!(out, "Total cases: {total_cases}")?;
    writeln!(out, "Passed: {}", passed_cases.to_string().green())?;
    writeln!(out, "Failed: {}", failed_cases.to_string().red())?;
    let success_rate = ratio(passed_cases, total_cases) * 100.0;
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.case_name.bold())?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Fires {} | Explosions {} | Skipped {} | Aborted {} | Mean damage {:.1}%",
            result.tally.fires,
            result.tally.explosions,
            result.tally.skipped,
            result.tally.aborted,
            result.tally.mean_damage_fraction() * 100.0
        )?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let total = total_tally(results);
    writeln!(out, "{}", "💥 Outcome Summary".bright_yellow().bold())?;
    writeln!(out, "{}", "==================".yellow())?;
    writeln!(
        out,
        "Resolved: {} (fire {}, explosion {})",
        total.resolved(),
        total.fires,
        total.explosions
    )?;
    writeln!(
        out,
        "Explosion rate: {:.1}%",
        total.explosion_rate() * 100.0
    )?;
    writeln!(
        out,
        "Mean damage: {:.1}% of max health",
        total.mean_damage_fraction() * 100.0
    )?;
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[SweepResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[SweepResult]) -> Result<()> {
    writeln!(out, "# Construction Disaster Sweep Results\n")?;

    let total_cases = results.len();
    let passed_cases = results.iter().filter(|r| r.passed).count();
    let success_rate = ratio(passed_cases, total_cases) * 100.0;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total cases**: {total_cases}")?;
    writeln!(out, "- **Passed**: {passed_cases}")?;
    writeln!(out, "- **Failed**: {}", total_cases - passed_cases)?;
    writeln!(out, "- **Success rate**: {success_rate:.1}%\n")?;

    writeln!(out, "## Cases\n")?;
    writeln!(
        out,
        "| Status | Case | Fires | Explosions | Skipped | Aborted | Mean damage |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {status} | {} | {} | {} | {} | {} | {:.1}% |",
            result.case_name,
            result.tally.fires,
            result.tally.explosions,
            result.tally.skipped,
            result.tally.aborted,
            result.tally.mean_damage_fraction() * 100.0
        )?;
    }

    let failing: Vec<&SweepResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {}\n", result.case_name)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, results: &[SweepResult]) -> Result<()> {
    writeln!(
        out,
        "seed,difficulty,heavy_allowed,passed,iterations,fires,explosions,skipped,aborted,mean_damage_fraction,explosion_rate"
    )?;
    for result in results {
        writeln!(
            out,
            "{},{:.2},{},{},{},{},{},{},{},{:.4},{:.4}",
            result.seed,
            result.difficulty,
            result.heavy_allowed,
            result.passed,
            result.iterations_run,
            result.tally.fires,
            result.tally.explosions,
            result.tally.skipped,
            result.tally.aborted,
            result.tally.mean_damage_fraction(),
            result.tally.explosion_rate()
        )?;
    }
    Ok(())
}
