//! Dashboard service.
//!
//! Figures are generated, not measured: each company gets its own stable set
//! of numbers and leads, derived from its id.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::config::{DASHBOARD_SERIES_DAYS, MOCK_LEADS_PER_COMPANY};
use crate::domain::{DailyCount, DashboardStats, Lead, LeadStatus};
use crate::types::{Paginated, PaginationParams};

pub trait DashboardService: Send + Sync {
    fn stats(&self, company_id: &str) -> DashboardStats;

    fn leads(&self, company_id: &str, params: &PaginationParams) -> Paginated<Lead>;
}

const FIRST_NAMES: [&str; 10] = [
    "Alex", "Maria", "James", "Priya", "Chen", "Fatima", "Lucas", "Emma", "Omar", "Sofia",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Garcia", "Johnson", "Patel", "Wang", "Khan", "Silva", "Brown", "Haddad", "Rossi",
];
const MAIL_DOMAINS: [&str; 4] = ["gmail.com", "outlook.com", "yahoo.com", "proton.me"];
const OPENERS: [&str; 6] = [
    "Do you offer a free trial?",
    "What are your pricing plans?",
    "Can I book a demo for my team?",
    "Do you ship internationally?",
    "How long does onboarding take?",
    "Is there a discount for annual billing?",
];
const STATUSES: [LeadStatus; 4] = [
    LeadStatus::New,
    LeadStatus::Contacted,
    LeadStatus::Qualified,
    LeadStatus::Converted,
];

/// SplitMix64 seeded from the company id.
struct SeededRng(u64);

impl SeededRng {
    fn for_company(company_id: &str, stream: u64) -> Self {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in company_id.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self(hash ^ stream)
    }

    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform-enough value in `low..=high`.
    fn between(&mut self, low: u64, high: u64) -> u64 {
        low + self.next() % (high - low + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next() % items.len() as u64) as usize]
    }
}

fn start_of_today() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_time(NaiveTime::default())
        .and_utc()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockDashboard;

impl MockDashboard {
    pub fn new() -> Self {
        Self
    }

    /// The full lead pool of a company, newest first.
    fn all_leads(&self, company_id: &str) -> Vec<Lead> {
        let mut rng = SeededRng::for_company(company_id, 2);
        let today = start_of_today();

        let mut leads: Vec<Lead> = (1..=MOCK_LEADS_PER_COMPANY)
            .map(|n| {
                let first = *rng.pick(&FIRST_NAMES);
                let last = *rng.pick(&LAST_NAMES);
                let domain = *rng.pick(&MAIL_DOMAINS);
                let phone = (rng.next() % 3 != 0)
                    .then(|| format!("+1 555 {:04}", rng.between(0, 9999)));
                let minutes_ago = rng.between(5, 30 * 24 * 60) as i64;

                Lead {
                    id: format!("lead_{:04}", n),
                    name: format!("{} {}", first, last),
                    email: format!("{}.{}@{}", first, last, domain).to_lowercase(),
                    phone,
                    status: *rng.pick(&STATUSES),
                    message: rng.pick(&OPENERS).to_string(),
                    captured_at: today - Duration::minutes(minutes_ago),
                }
            })
            .collect();

        leads.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        leads
    }
}

impl DashboardService for MockDashboard {
    fn stats(&self, company_id: &str) -> DashboardStats {
        let mut rng = SeededRng::for_company(company_id, 1);
        let today = start_of_today().date_naive();

        let conversations_by_day = (0..DASHBOARD_SERIES_DAYS)
            .rev()
            .map(|days_ago| DailyCount {
                date: today - Duration::days(days_ago),
                count: rng.between(5, 60),
            })
            .collect();

        let total_conversations = rng.between(200, 1200);
        let total_leads = MOCK_LEADS_PER_COMPANY;
        let conversion_rate =
            (total_leads as f64 / total_conversations as f64 * 1000.0).round() / 10.0;

        DashboardStats {
            total_conversations,
            total_leads,
            conversion_rate,
            avg_response_time_ms: rng.between(800, 2500),
            conversations_by_day,
        }
    }

    fn leads(&self, company_id: &str, params: &PaginationParams) -> Paginated<Lead> {
        let all = self.all_leads(company_id);
        let total = all.len() as u64;

        let data = all
            .into_iter()
            .skip(usize::try_from(params.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(params.limit()).unwrap_or(usize::MAX))
            .collect();

        Paginated::new(data, params.page(), params.limit(), total)
    }
}
