//! Keyword-classified action plans

use super::country::detect_country;

/// Produces advice without retrieval or a model. Never fails.
pub trait Advisor: Send + Sync {
    /// Advise on a question, with an optional country hint
    fn advise(&self, question: &str, country: Option<&str>) -> String;
}

/// Kind of legal issue a question is classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    SexualAssault,
    DocumentLoss,
    PassportRenewal,
    Criminal,
    Family,
    Property,
    Employment,
    General,
}

struct Playbook {
    kind: IssueKind,
    keywords: &'static [&'static str],
    greeting: &'static str,
    advice: &'static str,
    ending: &'static str,
}

/// Checked in order; the first playbook with a matching keyword is used
const PLAYBOOKS: &[Playbook] = &[
    Playbook {
        kind: IssueKind::SexualAssault,
        keywords: &["rape", "sexual assault", "molestation", "abuse", "harassment"],
        greeting: "🚨 Sexual Assault Emergency! You are not alone, and help is available!",
        advice: "🚨 IMMEDIATE CRISIS RESPONSE:

Step 1: 🆘 Get to Safety Immediately
• Move to a safe location
• Call emergency services if in immediate danger
• Contact a trusted friend or family member

Step 2: 🏥 Medical Attention (Within 72 hours)
• Go to the nearest hospital for medical examination
• Request a rape kit examination
• Get tested for STIs and pregnancy
• Document all injuries with photos

Step 3: 👮‍♀️ Legal Action (Within 24 hours)
• File FIR at the nearest police station
• Insist on getting a copy of the FIR
• Provide detailed statement to police
• Request protection if needed

Step 4: 📞 Support Services
• Contact National Commission for Women: 7827170170
• Call Women Helpline: 1091
• Reach out to local women's organizations
• Consider counseling support

Step 5: 📋 Documentation
• Keep all medical reports
• Preserve evidence (clothes, etc.)
• Document everything with dates
• Take photos of injuries

💡 CRITICAL REMINDERS:
• You are NOT to blame
• Your safety comes first
• Medical evidence is crucial
• Legal help is available
• Support groups can help

🆘 EMERGENCY NUMBERS:
• Police: 100
• Women Helpline: 1091
• National Commission for Women: 7827170170",
        ending: "💙 You are not alone. Help is available 24/7. Your safety and healing matter most.",
    },
    Playbook {
        kind: IssueKind::DocumentLoss,
        keywords: &["lost", "missing", "stolen", "misplaced"],
        greeting: "🛡️ Document Emergency! Don't panic, I've got your back!",
        advice: "📋 Document Recovery Action Plan:\n\n📋 Step 1: Report immediately to local police (get FIR copy)\n\n📋 Step 2: Contact passport office/embassy\n\n📋 Step 3: Gather supporting documents (ID proofs, photos)\n\n📋 Step 4: Apply for replacement with urgency\n\n📋 Step 5: Keep copies of all applications\n\n💡 Pro Tips:\n\n• File police complaint within 24 hours\n\n• Keep FIR copy safe - you'll need it\n\n• Contact embassy if abroad\n\n• Apply for emergency travel document if needed\n\n• Use passport tracking services",
        ending: "🛡️ Stay calm and act fast! Document recovery is possible with proper steps!",
    },
    Playbook {
        kind: IssueKind::PassportRenewal,
        keywords: &["passport", "renew", "renewal", "apply", "application"],
        greeting: "📋 Passport Services! Let's get your travel documents sorted!",
        advice: "🛂 Passport Renewal/Application Guide:\n\n📋 Step 1: Check eligibility and requirements\n\n📋 Step 2: Gather required documents (ID proofs, photos, address proof)\n\n📋 Step 3: Fill application form online or offline\n\n📋 Step 4: Pay applicable fees\n\n📋 Step 5: Submit application with all documents\n\n📋 Step 6: Track application status\n\n💡 Pro Tips:\n\n• Apply well before travel dates (3-6 months)\n\n• Keep all original documents ready\n\n• Use official government portals\n\n• Check processing times for your region\n\n• Keep application number safe for tracking",
        ending: "🛂 Plan ahead for smooth travel! Proper preparation ensures hassle-free passport services!",
    },
    Playbook {
        kind: IssueKind::Criminal,
        keywords: &["arrest", "police", "criminal", "jail"],
        greeting: "🚨 Criminal Case Alert! Stay calm, know your rights!",
        advice: "⚖️ Criminal Defense Action Plan:\n\n📋 Step 1: Know your rights (right to remain silent)\n\n📋 Step 2: Contact lawyer immediately\n\n📋 Step 3: Don't sign anything without legal advice\n\n📋 Step 4: Document everything (witnesses, evidence)\n\n📋 Step 5: Apply for bail if arrested\n\n💡 Pro Tips:\n\n• Remember: 'You have the right to remain silent'\n\n• Get lawyer contact before trouble\n\n• Keep evidence of innocence\n\n• Don't talk to police without lawyer\n\n• File complaints if rights violated",
        ending: "⚖️ Remember your rights! Stay strong and get proper legal representation!",
    },
    Playbook {
        kind: IssueKind::Family,
        keywords: &["divorce", "marriage", "family", "custody"],
        greeting: "💔 Family Law Matter! Let's handle this with care and wisdom!",
        advice: "👨‍👩‍👧‍👦 Family Law Action Plan:\n\n📋 Step 1: Document all incidents and communications\n\n📋 Step 2: Consult family law specialist\n\n📋 Step 3: Consider mediation first\n\n📋 Step 4: Gather financial documents\n\n📋 Step 5: Focus on children's best interests\n\n💡 Pro Tips:\n\n• Keep emotions separate from legal strategy\n\n• Document everything with dates\n\n• Consider counseling before legal action\n\n• Protect children from conflict\n\n• Maintain financial records",
        ending: "💝 Family matters need care! Focus on solutions that work for everyone!",
    },
    Playbook {
        kind: IssueKind::Property,
        keywords: &["property", "land", "house", "rent", "lease"],
        greeting: "🏠 Property Law Issue! Let's protect your rights!",
        advice: "🏘️ Property Law Action Plan:\n\n📋 Step 1: Gather all property documents\n\n📋 Step 2: Verify ownership and boundaries\n\n📋 Step 3: Consult property law expert\n\n📋 Step 4: Document all communications\n\n📋 Step 5: Consider legal notice if needed\n\n💡 Pro Tips:\n\n• Keep all property documents safe\n\n• Take photos of property condition\n\n• Maintain payment records\n\n• Get everything in writing\n\n• Know your tenant/owner rights",
        ending: "🏠 Property rights are fundamental! Protect what's yours with proper legal steps!",
    },
    Playbook {
        kind: IssueKind::Employment,
        keywords: &["work", "job", "employment", "salary", "termination"],
        greeting: "💼 Employment Law Issue! Let's fight for your workplace rights!",
        advice: "💼 Employment Law Action Plan:\n\n📋 Step 1: Document all workplace incidents\n\n📋 Step 2: Know your employment contract\n\n📋 Step 3: Contact labor department if needed\n\n📋 Step 4: Keep salary and work records\n\n📋 Step 5: Consider legal action if rights violated\n\n💡 Pro Tips:\n\n• Keep copies of all employment documents\n\n• Document harassment or discrimination\n\n• Know your working hours and overtime rights\n\n• File complaints with labor department\n\n• Don't sign anything under pressure",
        ending: "💼 Workplace rights matter! Stand up for fair treatment and proper compensation!",
    },
];

const GENERAL: Playbook = Playbook {
    kind: IssueKind::General,
    keywords: &[],
    greeting: "⚖️ Legal Guidance! Here's your action plan!",
    advice: "🎯 General Legal Guidance - Your Action Plan:\n\n📋 Step 1: Document everything (your evidence collection)\n\n📋 Step 2: Research your specific legal rights (your knowledge power)\n\n📋 Step 3: Contact relevant authorities (your legal guardians)\n\n📋 Step 4: Consider consulting a lawyer (your legal expert)\n\n📋 Step 5: Follow proper legal procedures (your legal roadmap)\n\n💡 Pro Tips:\n\n• Keep all documents and evidence organized\n\n• Take photos and screenshots when relevant\n\n• Stay calm and professional in all interactions\n\n• Know your rights but also your responsibilities\n\n• Consider mediation before going to court",
    ending: "💪 You've got this! Knowledge is power - use these steps wisely!",
};

fn playbook_for(question: &str) -> &'static Playbook {
    let lower = question.to_lowercase();
    PLAYBOOKS
        .iter()
        .find(|playbook| playbook.keywords.iter().any(|k| lower.contains(k)))
        .unwrap_or(&GENERAL)
}

/// Keyword-driven advisor with fixed action plans
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    /// Create a new advisor
    pub fn new() -> Self {
        Self
    }

    /// Classify a question by its first matching keyword group
    pub fn classify(question: &str) -> IssueKind {
        playbook_for(question).kind
    }
}

impl Advisor for RuleBasedAdvisor {
    fn advise(&self, question: &str, country: Option<&str>) -> String {
        let playbook = playbook_for(question);
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| detect_country(question));

        let mut text = format!("{}\n\n{}", playbook.greeting, playbook.advice);
        if let Some(country) = country {
            text.push_str(&format!(
                "\n\n🌍 Country-Specific Note: This advice is general. For {}-specific laws, consult a local legal expert.",
                country
            ));
        }
        text.push_str("\n\n");
        text.push_str(playbook.ending);
        text
    }
}
