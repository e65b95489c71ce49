//! Built-in directory of competitive entrance exams, searchable by name and
//! stream, plus a per-state lookup of the exams students there usually sit.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamLevel {
    National,
    State,
}

impl ExamLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::National => "National",
            Self::State => "State",
        }
    }
}

impl fmt::Display for ExamLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    pub id: &'static str,
    pub name: &'static str,
    /// One of the goal-stream ids from [`crate::catalog::goal_streams`].
    pub stream: &'static str,
    pub level: ExamLevel,
    pub exam_month: &'static str,
    pub eligibility: &'static str,
    pub pattern: &'static str,
    pub official_url: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn exam(
    id: &'static str,
    name: &'static str,
    stream: &'static str,
    level: ExamLevel,
    exam_month: &'static str,
    eligibility: &'static str,
    pattern: &'static str,
    official_url: &'static str,
) -> Exam {
    Exam {
        id,
        name,
        stream,
        level,
        exam_month,
        eligibility,
        pattern,
        official_url,
    }
}

static EXAMS: [Exam; 15] = [
    exam(
        "jee-main",
        "JEE Main",
        "Engineering & Technology",
        ExamLevel::National,
        "Jan & Apr",
        "Class 12 (PCM), min 75% or top 20 percentile",
        "300 marks | 75 MCQ + Numerical | 3 hrs | Physics, Chemistry, Maths",
        "https://jeemain.nta.nic.in",
    ),
    exam(
        "neet-ug",
        "NEET UG",
        "Medical & Healthcare",
        ExamLevel::National,
        "May",
        "Class 12 (PCB), min 50% marks",
        "720 marks | 180 MCQ | 3 hrs 20 min | Physics, Chemistry, Biology",
        "https://neet.nta.nic.in",
    ),
    exam(
        "upsc-cse",
        "UPSC CSE",
        "Law & Public Policy",
        ExamLevel::National,
        "Jun (Prelims), Sep (Mains)",
        "Any graduate, age 21-32 (Gen)",
        "Prelims: 400 marks | Mains: 1750 marks | Interview: 275 marks",
        "https://upsc.gov.in",
    ),
    exam(
        "cat",
        "CAT",
        "Business & Finance",
        ExamLevel::National,
        "Nov",
        "Any graduate with min 50% (45% for SC/ST)",
        "198 marks | 66 MCQ + TITA | 2 hrs | VARC, DILR, QA",
        "https://iimcat.ac.in",
    ),
    exam(
        "clat",
        "CLAT",
        "Law & Public Policy",
        ExamLevel::National,
        "Dec",
        "Class 12 with min 45% marks",
        "120 marks | 120 MCQ | 2 hrs | English, GK, Legal, Logical, Math",
        "https://consortiumofnlus.ac.in",
    ),
    exam(
        "nda",
        "NDA",
        "Law & Public Policy",
        ExamLevel::National,
        "Apr & Sep",
        "Class 12 (PCM for Army/AF/Navy), unmarried male, age 16.5-19.5",
        "Maths: 300 | GAT: 600 | SSB Interview",
        "https://upsc.gov.in/examinations/active-examinations/nda-na",
    ),
    exam(
        "gate",
        "GATE",
        "Engineering & Technology",
        ExamLevel::National,
        "Feb",
        "B.E./B.Tech or final year student",
        "100 marks | 65 Questions | 3 hrs | MCQ, MSQ, NAT",
        "https://gate2025.iitr.ac.in",
    ),
    exam(
        "cuet-ug",
        "CUET UG",
        "Education & Research",
        ExamLevel::National,
        "May-Jun",
        "Class 12 pass (any stream)",
        "Domain subjects + General Test | Multiple sessions",
        "https://cuet.samarth.ac.in",
    ),
    exam(
        "ssc-cgl",
        "SSC CGL",
        "Business & Finance",
        ExamLevel::National,
        "Sep-Oct",
        "Any graduate, age 18-32",
        "Tier 1: 200 marks MCQ | Tier 2: 300 marks | 2 hrs each",
        "https://ssc.nic.in",
    ),
    exam(
        "nift-nid",
        "NIFT / NID",
        "Design & Creative Arts",
        ExamLevel::National,
        "Jan (NID), Feb (NIFT)",
        "Class 12 pass (any stream), age up to 24",
        "CAT + GAT test | Situation Test | Studio Test / Interview",
        "https://nift.ac.in",
    ),
    exam(
        "mht-cet",
        "MHT-CET",
        "Engineering & Technology",
        ExamLevel::State,
        "Apr-May",
        "Class 12 (PCM), Maharashtra domicile preferred",
        "200 marks | 150 MCQ | 3 hrs | Maths, Physics, Chemistry",
        "https://cetcell.mahacet.org",
    ),
    exam(
        "kcet",
        "KCET",
        "Engineering & Technology",
        ExamLevel::State,
        "Apr",
        "Class 12 (PCM/PCB), Karnataka domicile",
        "180 marks | Physics + Chemistry + Maths/Biology | 80 min each",
        "https://cetonline.karnataka.gov.in",
    ),
    exam(
        "wbjee",
        "WBJEE",
        "Engineering & Technology",
        ExamLevel::State,
        "Apr",
        "Class 12 (PCM), West Bengal domicile preferred",
        "200 marks | Mathematics + Physics + Chemistry | 2 hrs each",
        "https://wbjeeb.nic.in",
    ),
    exam(
        "ap-eamcet",
        "AP EAMCET",
        "Engineering & Technology",
        ExamLevel::State,
        "May",
        "Class 12 (PCM/PCB), Andhra Pradesh domicile",
        "160 marks | 160 MCQ | 3 hrs | Maths/Biology, Physics, Chemistry",
        "https://sche.ap.gov.in/eapcet",
    ),
    exam(
        "tnea",
        "TNEA",
        "Engineering & Technology",
        ExamLevel::State,
        "Jul (Counselling)",
        "Class 12 (PCM), Tamil Nadu domicile preferred; merit-based, no entrance exam",
        "No entrance test: merit based on Class 12 marks",
        "https://tneaonline.org",
    ),
];

#[must_use]
pub fn exams() -> &'static [Exam] {
    &EXAMS
}

/// Narrows the directory. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamFilter {
    /// Case-insensitive substring over exam name and stream.
    pub search: Option<String>,
    /// Exact stream id, case-insensitive. `All` is treated as unset.
    pub stream: Option<String>,
    pub level: Option<ExamLevel>,
}

impl ExamFilter {
    #[must_use]
    pub fn matches(&self, exam: &Exam) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let by_search = search.is_none_or(|needle| {
            exam.name.to_lowercase().contains(&needle)
                || exam.stream.to_lowercase().contains(&needle)
        });

        let by_stream = self
            .stream
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
            .is_none_or(|stream| exam.stream.eq_ignore_ascii_case(stream));

        let by_level = self.level.is_none_or(|level| exam.level == level);

        by_search && by_stream && by_level
    }
}

/// Directory entries passing `filter`, in catalog order.
#[must_use]
pub fn filter_exams(filter: &ExamFilter) -> Vec<&'static Exam> {
    EXAMS.iter().filter(|exam| filter.matches(exam)).collect()
}

//
// ─── BY STATE ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionExam {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Two-letter state code, or `national`.
    pub code: &'static str,
    pub name: &'static str,
    pub exams: &'static [RegionExam],
}

const fn region_exam(name: &'static str, description: &'static str) -> RegionExam {
    RegionExam { name, description }
}

static REGIONS: [Region; 7] = [
    Region {
        code: "MH",
        name: "Maharashtra",
        exams: &[
            region_exam(
                "MHT CET",
                "Common Entrance Test for engineering and pharmacy courses in Maharashtra state colleges.",
            ),
            region_exam(
                "MPSC",
                "Maharashtra Public Service Commission exam for state government administrative positions.",
            ),
            region_exam(
                "MAH MBA CET",
                "State-level entrance for MBA/MMS programs in Maharashtra universities.",
            ),
        ],
    },
    Region {
        code: "DL",
        name: "Delhi",
        exams: &[
            region_exam(
                "Delhi CET",
                "Common Entrance Test for polytechnic and diploma admissions in Delhi colleges.",
            ),
            region_exam(
                "IPU CET",
                "Guru Gobind Singh Indraprastha University entrance for engineering, law, and management.",
            ),
        ],
    },
    Region {
        code: "KA",
        name: "Karnataka",
        exams: &[
            region_exam(
                "KCET",
                "Karnataka Common Entrance Test for professional courses in engineering and medicine.",
            ),
            region_exam(
                "KPSC",
                "Karnataka Public Service Commission exam for state-level civil services.",
            ),
        ],
    },
    Region {
        code: "TN",
        name: "Tamil Nadu",
        exams: &[
            region_exam(
                "TNEA",
                "Tamil Nadu Engineering Admissions based on 12th marks for B.E./B.Tech courses.",
            ),
            region_exam(
                "TNPSC",
                "Tamil Nadu Public Service Commission exam for state government positions.",
            ),
        ],
    },
    Region {
        code: "UP",
        name: "Uttar Pradesh",
        exams: &[
            region_exam(
                "UPSEE / AKTU",
                "State entrance exam for engineering, pharmacy, and MBA programs in UP.",
            ),
            region_exam(
                "UPPSC",
                "Uttar Pradesh Public Service Commission for state administrative services.",
            ),
        ],
    },
    Region {
        code: "RJ",
        name: "Rajasthan",
        exams: &[
            region_exam(
                "RPSC RAS",
                "Rajasthan Administrative Services exam conducted by RPSC for state officers.",
            ),
            region_exam(
                "REEET",
                "Rajasthan Eligibility Examination for Teachers, mandatory for teaching positions.",
            ),
        ],
    },
    Region {
        code: "national",
        name: "National Level",
        exams: &[
            region_exam(
                "JEE Main & Advanced",
                "National exam for admission to IITs, NITs, and top engineering colleges.",
            ),
            region_exam(
                "NEET",
                "National Eligibility cum Entrance Test for MBBS, BDS, and medical courses.",
            ),
            region_exam(
                "UPSC CSE",
                "Civil Services Examination for IAS, IPS, and central government officers.",
            ),
            region_exam(
                "CUET",
                "Common University Entrance Test for admission to central universities across India.",
            ),
        ],
    },
];

#[must_use]
pub fn regions() -> &'static [Region] {
    &REGIONS
}

/// Look a region up by code or name, ignoring case and surrounding space.
#[must_use]
pub fn find_region(query: &str) -> Option<&'static Region> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    REGIONS.iter().find(|region| {
        region.code.eq_ignore_ascii_case(query) || region.name.eq_ignore_ascii_case(query)
    })
}
