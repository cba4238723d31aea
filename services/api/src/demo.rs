use crate::infra::seed_demo_directory;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tell_matching::config::MatchingConfig;
use tell_matching::error::AppError;
use tell_matching::matching::{
    BatchCoordinator, BatchJobSnapshot, InMemoryMatchStore, MatchFactors, MatchingService,
    MentorRosterImporter, TopMatchView, UserId,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Mentor roster CSV to score against instead of the built-in demo mentors.
    #[arg(long)]
    pub(crate) mentors_csv: Option<PathBuf>,
    /// Mentee whose ranking is printed.
    #[arg(long, default_value = "u-amara")]
    pub(crate) user: String,
    /// Number of recommendations to print.
    #[arg(long, default_value_t = 3)]
    pub(crate) limit: usize,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        mentors_csv,
        user,
        limit,
    } = args;

    let roster = mentors_csv
        .as_ref()
        .map(MentorRosterImporter::from_path)
        .transpose()?;
    let imported = roster.as_ref().map(Vec::len);

    let directory = Arc::new(seed_demo_directory(roster));
    let store = Arc::new(InMemoryMatchStore::default());
    let config = MatchingConfig::default();
    let service = Arc::new(MatchingService::new(directory.clone(), store.clone(), &config));

    println!("TELL mentor matching demo");
    match (imported, mentors_csv.as_ref()) {
        (Some(count), Some(path)) => {
            println!("Roster: {count} mentors imported from {}", path.display())
        }
        _ => println!("Roster: {} built-in demo mentors", directory.mentor_count()),
    }

    let user_id = UserId(user);
    let scores = service.calculate_matching(&user_id)?;
    println!(
        "\nScored {} against {} active mentors",
        user_id,
        scores.len()
    );

    let top = service.top_matches(&user_id, Some(limit.max(1)))?;
    render_ranking(&top);

    let batches = BatchCoordinator::new(service, config.batch_workers);
    let ticket = batches.start(None)?;
    println!(
        "\nBatch {} accepted for {} users",
        ticket.job_id, ticket.total_users
    );
    if let Some(snapshot) = batches.wait(&ticket.job_id).await {
        render_batch(&snapshot);
    }
    println!("Stored match records: {}", store.len());

    Ok(())
}

fn render_ranking(matches: &[TopMatchView]) {
    if matches.is_empty() {
        println!("No active matches on file.");
        return;
    }

    println!("Top recommendations:");
    for (rank, entry) in matches.iter().enumerate() {
        let label = entry
            .mentor
            .as_ref()
            .map(|mentor| format!("{} ({})", mentor.name, mentor.headline))
            .unwrap_or_else(|| entry.record.mentor_id.to_string());
        println!(
            "  {}. {} - {}",
            rank + 1,
            label,
            entry.record.compatibility_score
        );
        println!("     {}", factor_line(&entry.record.match_factors));
    }
}

fn factor_line(factors: &MatchFactors) -> String {
    format!(
        "field {:.0} | experience {:.0} | learning {:.0} | skills {:.0} | goals {:.0}",
        factors.career_field_match,
        factors.experience_level_match,
        factors.learning_style_match,
        factors.skills_match,
        factors.career_goals_match
    )
}

fn render_batch(snapshot: &BatchJobSnapshot) {
    println!(
        "Batch {} finished: {} processed | {} failed | {} total",
        snapshot.job_id, snapshot.processed, snapshot.failed, snapshot.total_users
    );
    for failure in &snapshot.failures {
        println!("  - {}: {}", failure.user_id, failure.error);
    }
}
