//! Built-in question catalogs: the behavioral discovery quiz and the per-stream
//! goal-fit quizzes.

use crate::model::{Choice, Question, QuestionSet, QuestionSetError};

type QuestionSpec = (&'static str, &'static str, [(&'static str, &'static str); 3]);

const DISCOVERY: [QuestionSpec; 6] = [
    (
        "pressure_fear",
        "When facing a high-stakes component failure or public mistake, what is your immediate visceral reaction?",
        [
            ("Fear of public visibility / embarrassment", "public_visibility"),
            ("Anxiety about technical complexity / fixing it", "technical_complexity"),
            ("Dread of letting down the team / responsibility", "responsibility_failure"),
        ],
    ),
    (
        "life_preference",
        "Which lifestyle reality would you honestly choose for the next 10 years?",
        [
            ("High Income + High Stress + No Work-Life Balance", "high_income_high_stress"),
            ("Average Income + Peaceful 9-5 + Low Stress", "stable_peaceful"),
            ("Unstable Income + Complete Freedom + Travel", "flexible_unstable"),
        ],
    ),
    (
        "team_role",
        "In a chaotic group project, who do you actually become?",
        [
            ("The Leader (Commanding everyone)", "leader"),
            ("The Strategist (Planning privately)", "strategist"),
            ("The Executor (Just tell me what to do)", "executor"),
        ],
    ),
    (
        "failure_response",
        "What hurts you the most about failing?",
        [
            ("People judging me / Social Image", "social_judgement"),
            ("Disappointing myself / My standards", "self_disappointment"),
            ("The lost opportunity / Wasted time", "lost_opportunity"),
        ],
    ),
    (
        "energy_drain",
        "What exhausts you the fastest?",
        [
            ("Constant people interaction / Meetings", "people_interaction"),
            ("Deep, isolated technical thinking", "deep_technical_thinking"),
            ("Repetitive, boring routine tasks", "repetitive_routine"),
        ],
    ),
    (
        "risk_tolerance",
        "Which 'Risk' scares you less?",
        [
            ("High Competition (Fighting for top spot)", "high_competition"),
            ("Long-term Study (No money for years)", "long_term_study"),
            ("Unstable Income (Feast or Famine)", "unstable_income"),
        ],
    ),
];

struct StreamSpec {
    id: &'static str,
    description: &'static str,
    questions: [QuestionSpec; 4],
}

const GOAL_STREAMS: [StreamSpec; 6] = [
    StreamSpec {
        id: "Engineering & Technology",
        description: "Software, hardware, AI, robotics, data science",
        questions: [
            ("q1", "When stuck on a difficult math/coding problem, how do you feel?", [
                ("Excited to solve it", "excited_problem_solving"),
                ("Mentally tired but satisfied", "mentally_tired_but_satisfied"),
                ("Frustrated and bored", "frustrated_and_bored"),
            ]),
            ("q2", "If your code/project fails 10 times, what do you do?", [
                ("Calmly debug again", "debug_calmly_again"),
                ("Search for a quick fix", "search_quick_solution"),
                ("Give up, it's irritating", "give_up_irritated"),
            ]),
            ("q3", "How do you feel about learning new tools every 6 months?", [
                ("Love it, tech changes fast!", "enjoy_learning_new_tech"),
                ("I'll learn only if required", "learn_only_if_required"),
                ("I hate frequent changes", "avoid_frequent_changes"),
            ]),
            ("q4", "Why do you want to choose Engineering?", [
                ("I love building & solving things", "love_problem_solving"),
                ("It pays a good salary", "good_salary_scope"),
                ("My parents/friends suggested it", "family_or_society_pressure"),
            ]),
        ],
    },
    StreamSpec {
        id: "Medical & Healthcare",
        description: "Medicine, nursing, pharmacy, biotech, research",
        questions: [
            ("q1", "Are you ready to study for 5-8+ years before a stable income?", [
                ("Yes, I'm dedicated", "ready_for_long_study"),
                ("Maybe, if I stay motivated", "maybe_if_motivated"),
                ("No, I want early earnings", "want_early_income"),
            ]),
            ("q2", "How do you react to blood, pain, or critical patient situations?", [
                ("I stay calm and focused", "stay_calm"),
                ("Uncomfortable but I can manage", "uncomfortable_but_manage"),
                ("I get emotionally disturbed", "emotionally_disturbed"),
            ]),
            ("q3", "Can you handle high-pressure emergency situations?", [
                ("I stay professional", "stay_professional"),
                ("I get emotionally affected", "emotionally_affected"),
                ("I take it personally", "take_it_personally"),
            ]),
            ("q4", "Meaning of success in medicine for you?", [
                ("Saving lives & helping people", "want_to_help_people"),
                ("Respect, status, and stability", "respect_and_stability"),
                ("Family pressure to be a doctor", "family_pressure"),
            ]),
        ],
    },
    StreamSpec {
        id: "Law & Public Policy",
        description: "Legal practice, judiciary, civil services, governance",
        questions: [
            ("q1", "Do you enjoy public speaking and debating?", [
                ("Yes, I'm very confident", "confident_speaker"),
                ("Sometimes confident", "sometimes_confident"),
                ("No, I get nervous", "not_confident"),
            ]),
            ("q2", "Can you read 500+ pages of dense text (case files/laws) weekly?", [
                ("Yes, I enjoy deep reading", "enjoy_deep_reading"),
                ("Only when required", "read_when_required"),
                ("No, I avoid long reading", "avoid_long_reading"),
            ]),
            ("q3", "How do you handle losing an argument?", [
                ("Analyze and prepare stronger", "prepare_stronger"),
                ("Get upset but move on", "upset_but_move_on"),
                ("Get discouraged easily", "discouraged_easily"),
            ]),
            ("q4", "What draws you to Law?", [
                ("Fighting for justice/truth", "love_debate_and_justice"),
                ("Power, status, and debating", "status_and_power"),
                ("External influence (movies/family)", "external_influence"),
            ]),
        ],
    },
    StreamSpec {
        id: "Business & Finance",
        description: "Management, entrepreneurship, banking, investment",
        questions: [
            ("q1", "How do you feel about financial risk?", [
                ("I accept risk for growth", "accept_risk"),
                ("I get slightly worried", "slightly_worried"),
                ("I need a safe, stable salary", "need_stable_salary"),
            ]),
            ("q2", "Are you good with numbers and money management?", [
                ("Confident and intuitive", "confident_with_money"),
                ("I learn slowly", "learn_slowly"),
                ("Nervous about calculations", "nervous_about_money"),
            ]),
            ("q3", "How do you view competition?", [
                ("I enjoy winning against others", "enjoy_competition"),
                ("I accept it as part of work", "accept_competition"),
                ("I avoid competitive environments", "avoid_competition"),
            ]),
            ("q4", "Primary motivation for Business?", [
                ("Building something new", "want_to_build_something"),
                ("Accumulating wealth", "money_growth"),
                ("Looking cool / Influencer trend", "trend_or_influence"),
            ]),
        ],
    },
    StreamSpec {
        id: "Design & Creative Arts",
        description: "Graphic design, UX/UI, animation, fashion, film",
        questions: [
            ("q1", "How do you react to harsh criticism of your work?", [
                ("Use it to improve & retry", "improve_and_retry"),
                ("Feel bad but retry", "feel_bad_but_retry"),
                ("Feel demotivated & stop", "feel_demotivated"),
            ]),
            ("q2", "Creative fields can have unstable income initially. Thoughts?", [
                ("I accept the struggle", "accept_unstable_income"),
                ("Slightly worried", "slight_worry"),
                ("Not acceptable", "not_acceptable"),
            ]),
            ("q3", "Do you prefer a fixed 9-5 routine or creative freedom?", [
                ("Creative freedom (even if chaotic)", "creative_freedom"),
                ("Balanced work", "balanced_work"),
                ("Fixed routine and order", "fixed_routine"),
            ]),
            ("q4", "Why choose Creative Arts?", [
                ("Pure passion for creating", "passion_for_creativity"),
                ("Want a flexible lifestyle", "flexible_lifestyle"),
                ("To escape academic studying", "escape_academics"),
            ]),
        ],
    },
    StreamSpec {
        id: "Education & Research",
        description: "Teaching, academia, scientific research, PhD",
        questions: [
            ("q1", "How do you feel about studying a single topic deeply for years?", [
                ("I enjoy deep study", "enjoy_deep_study"),
                ("Manageable", "manageable"),
                ("Boring", "boring"),
            ]),
            ("q2", "Research requires patience with slow results. You are?", [
                ("Patient and consistent", "patient_and_consistent"),
                ("I feel progress is slow", "feel_slow_progress"),
                ("Frustrated quickly", "frustrated_quickly"),
            ]),
            ("q3", "Do you enjoy explaining complex concepts to others?", [
                ("Love teaching/explaining", "enjoy_explaining"),
                ("Neutral feeling", "neutral_feeling"),
                ("It's tiring repetition", "tiring_repetition"),
            ]),
            ("q4", "Why Education/Research?", [
                ("Love for knowledge & discovery", "love_for_knowledge"),
                ("Job stability (Professor)", "job_stability"),
                ("It's a safe option", "safe_option"),
            ]),
        ],
    },
];

fn build(specs: &[QuestionSpec]) -> Result<QuestionSet, QuestionSetError> {
    QuestionSet::new(
        specs
            .iter()
            .map(|(id, prompt, choices)| {
                Question::new(
                    *id,
                    *prompt,
                    choices
                        .iter()
                        .map(|(label, value)| Choice::new(*label, *value))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// The six-question behavioral discovery quiz.
///
/// # Errors
///
/// Only fails if the built-in catalog itself is malformed.
pub fn discovery_questions() -> Result<QuestionSet, QuestionSetError> {
    build(&DISCOVERY)
}

/// A target stream with its goal-fit questions.
#[derive(Debug, Clone)]
pub struct GoalStream {
    pub id: &'static str,
    pub description: &'static str,
    pub questions: QuestionSet,
}

impl GoalStream {
    /// Streams are titled by their id.
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.id
    }
}

/// All goal-fit streams in display order.
///
/// # Errors
///
/// Only fails if the built-in catalog itself is malformed.
pub fn goal_streams() -> Result<Vec<GoalStream>, QuestionSetError> {
    GOAL_STREAMS
        .iter()
        .map(|spec| {
            Ok(GoalStream {
                id: spec.id,
                description: spec.description,
                questions: build(&spec.questions)?,
            })
        })
        .collect()
}

/// Look a stream up by id, case-insensitively.
///
/// # Errors
///
/// Only fails if the built-in catalog itself is malformed.
pub fn find_goal_stream(id: &str) -> Result<Option<GoalStream>, QuestionSetError> {
    let needle = id.trim();
    Ok(goal_streams()?
        .into_iter()
        .find(|stream| stream.id.eq_ignore_ascii_case(needle)))
}
