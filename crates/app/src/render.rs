//! Plain-text rendering of hydrated results for the terminal.

use career_core::exams::{Exam, Region};
use career_core::model::{CompletionMap, DiscoverProfile, Roadmap, SprintPlan, StreamFit};
use services::{ChecklistView, Dashboard};

fn bullets(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}");
    for item in items {
        println!("  - {item}");
    }
}

fn bar(percent: u8) -> String {
    let filled = (usize::from(percent) / 5).min(20);
    format!("[{}{}] {percent:>3}%", "#".repeat(filled), ".".repeat(20 - filled))
}

pub fn profile(profile: &DiscoverProfile) {
    println!("\n== Your profile ==\n{}", profile.core_personality_insight);
    if !profile.honest_reality_check.is_empty() {
        println!("\nReality check: {}", profile.honest_reality_check);
    }

    println!("\nSuggested streams");
    for stream in &profile.suitable_career_streams {
        match &stream.avg_salary_range {
            Some(range) => println!("  - {} ({range})", stream.name),
            None => println!("  - {}", stream.name),
        }
    }
    println!("\nIdeal roles");
    for role in &profile.ideal_career_roles {
        match &role.avg_starting_salary {
            Some(salary) => println!("  - {} ({salary})", role.role),
            None => println!("  - {}", role.role),
        }
    }

    bullets("Career types to avoid", &profile.career_types_to_avoid);
    bullets("Skill gaps", &profile.skill_gaps);

    if !profile.personality_axes.is_empty() {
        println!("\nPersonality");
        for axis in &profile.personality_axes {
            println!("  {:<24} {}", axis.axis, bar(axis.score));
            if let Some(why) = profile.radar_trait_explanation.get(&axis.axis) {
                println!("  {:<24} {why}", "");
            }
        }
    }
}

pub fn stream_fit(stream: &str, fit: &StreamFit) {
    println!("\n== {stream}: {} ==", fit.fit_level.label());
    println!("Alignment {}", bar(fit.alignment_score));
    if !fit.core_analysis.is_empty() {
        println!("\n{}", fit.core_analysis);
    }
    bullets("Strengths", &fit.strengths);
    bullets("Risk factors", &fit.risk_factors);
    bullets("How to improve", &fit.improvement_advice);
    if !fit.final_verdict.is_empty() {
        println!("\nVerdict: {}", fit.final_verdict);
    }
}

pub fn roadmap(stream: &str, roadmap: &Roadmap) {
    println!("\n== Roadmap: {stream} ==");
    if roadmap.is_empty() {
        println!("The guidance service returned no phases.");
        return;
    }
    for phase in &roadmap.phases {
        match &phase.subtitle {
            Some(subtitle) => println!("\n{} ({subtitle})", phase.title),
            None => println!("\n{}", phase.title),
        }
        bullets("Focus", &phase.focus);
        bullets("Avoid", &phase.avoid);
        if !phase.resources.is_empty() {
            println!("\nResources");
            for resource in &phase.resources {
                let kind = if resource.is_video() { "video" } else { resource.kind.as_str() };
                match &resource.url {
                    Some(url) => println!("  - [{kind}] {} <{url}>", resource.title),
                    None => println!("  - [{kind}] {}", resource.title),
                }
            }
        }
    }
}

pub fn checklist(plan: &SprintPlan, completed: &CompletionMap, view: &ChecklistView) {
    println!(
        "\n== Sprint: {}/{} tasks {} ==",
        view.completed,
        view.total,
        bar(view.percent)
    );
    for week in &plan.weeks {
        let done = week.done_count(completed);
        match &week.theme {
            Some(theme) => println!("\nWeek {} ({done}/{}): {theme}", week.index, week.tasks.len()),
            None => println!("\nWeek {} ({done}/{})", week.index, week.tasks.len()),
        }
        for task in &week.tasks {
            let mark = if completed.is_done(&task.id) { "x" } else { " " };
            let estimate = task
                .estimate
                .as_deref()
                .map(|e| format!(" ~{e}"))
                .unwrap_or_default();
            println!("  [{mark}] {:<8} {}{estimate}", task.id, task.description);
            if let Some(resource) = &task.resource {
                println!("               {}: {}", resource.display_label(), resource.url);
            }
        }
    }
}

pub fn dashboard(dashboard: &Dashboard) {
    match &dashboard.profile {
        Some((profile, saved_at)) => {
            println!("Profile (saved {})", saved_at.format("%Y-%m-%d %H:%M"));
            println!("  {}", profile.core_personality_insight);
            println!("  Streams: {}", profile.stream_names().join(", "));
        }
        None => println!("No discovery result yet."),
    }

    if dashboard.recent_roadmaps.is_empty() {
        println!("\nNo roadmaps yet.");
    } else {
        println!("\nRecent roadmaps");
        for saved in &dashboard.recent_roadmaps {
            println!(
                "  #{:<4} {} ({} phases, {})",
                saved.id,
                saved.stream,
                saved.roadmap.phases.len(),
                saved.generated_at.format("%Y-%m-%d")
            );
        }
    }

    match &dashboard.sprint {
        Some(view) => {
            println!("\nSprint {}", bar(view.percent));
            for week in &view.weeks {
                let mark = if week.is_complete() { "x" } else { " " };
                println!("  [{mark}] week {:>2}: {}/{}", week.index, week.done, week.total);
            }
        }
        None => println!("\nNo sprint yet."),
    }
}

pub fn exams(found: &[&Exam]) {
    if found.is_empty() {
        println!("No exams match.");
        return;
    }
    for exam in found {
        println!("\n{} [{}] {}", exam.name, exam.level, exam.stream);
        println!("  When:        {}", exam.exam_month);
        println!("  Eligibility: {}", exam.eligibility);
        println!("  Pattern:     {}", exam.pattern);
        println!("  Official:    {}", exam.official_url);
    }
}

pub fn region(region: &Region) {
    println!("\n== Exams in {} ==", region.name);
    for exam in region.exams {
        println!("\n{}\n  {}", exam.name, exam.description);
    }
}
