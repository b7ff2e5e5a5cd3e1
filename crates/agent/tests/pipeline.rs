//! End-to-end behavior of `PageAgent` over a temporary project with a
//! scripted completion service and checker.

use pagewright_agent::PageAgent;
use pagewright_config::AppConfig;
use pagewright_core::testing::SequentialMockProvider;
use pagewright_core::{
    AgentError, EditRequest, InstructionPayload, Intent, RequestKind, ToolDecision,
    ValidationStatus, tool_names,
};
use pagewright_validator::testing::ScriptedChecker;
use std::sync::Arc;

const HERO: &str = r#"export default function Hero() {
  return (
    <section className="bg-white py-24">
      <h1 className="text-4xl font-bold">Ship faster</h1>
      <button className="rounded bg-blue-600 px-4 text-white">Get started</button>
    </section>
  );
}
"#;

const HEADER: &str = r#"export default function Header() {
  return <header className="border-b border-gray-200"><a href="/">Home</a></header>;
}
"#;

const PRICING: &str = r#"export default function Pricing() {
  return <section className="bg-white">Plans</section>;
}
"#;

const PAGE: &str = r#"import Header from "@/components/Header";
import Hero from "@/components/Hero";
import Pricing from "@/components/Pricing";

export default function Page() {
  return (
    <main>
      <Header />
      <Hero />
      <Pricing />
    </main>
  );
}
"#;

struct Project {
    dir: tempfile::TempDir,
    provider: Arc<SequentialMockProvider>,
    checker: Arc<ScriptedChecker>,
    agent: PageAgent,
}

impl Project {
    fn new(provider: SequentialMockProvider, checker: ScriptedChecker) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let components = dir.path().join("src/components");
        std::fs::create_dir_all(&components).unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(components.join("Hero.tsx"), HERO).unwrap();
        std::fs::write(components.join("Header.tsx"), HEADER).unwrap();
        std::fs::write(components.join("Pricing.tsx"), PRICING).unwrap();
        std::fs::write(dir.path().join("src/app/page.tsx"), PAGE).unwrap();

        let mut config = AppConfig::default();
        config.project.root = dir.path().to_string_lossy().into_owned();

        let provider = Arc::new(provider);
        let checker = Arc::new(checker);
        let agent = PageAgent::from_parts(&config, provider.clone(), checker.clone());
        Self {
            dir,
            provider,
            checker,
            agent,
        }
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(relative)).unwrap()
    }

    fn component(&self, name: &str) -> String {
        self.read(&format!("src/components/{name}.tsx"))
    }
}

#[tokio::test]
async fn targeted_color_edit_runs_without_the_service() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    let response = p
        .agent
        .handle(EditRequest::new("hero: change the button color to red"))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.tool.as_deref(), Some(tool_names::COLOR_UPDATE));
    assert!(!response.provisional);
    assert!(p.component("Hero").contains("bg-red-600 px-4"));
    assert_eq!(p.checker.invocations(), 1);
    assert_eq!(p.provider.call_count(), 0);
    assert_eq!(response.result.unwrap()["validation"]["status"], "pass");
}

#[tokio::test]
async fn missing_attachment_stops_before_selection() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    let response = p
        .agent
        .handle(EditRequest::new("swap the hero photo for something brighter"))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_kind.as_deref(), Some("MissingAttachment"));
    assert!(!response.suggestions.is_empty());
    assert_eq!(p.provider.call_count(), 0);
    assert_eq!(p.component("Hero"), HERO);
}

#[tokio::test]
async fn ambiguous_target_with_unreachable_service_fails_with_suggestions() {
    let p = Project::new(SequentialMockProvider::unreachable(), ScriptedChecker::always_pass());
    let response = p
        .agent
        .handle(EditRequest::new("update the hero and header colors"))
        .await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("ExternalServiceUnavailable"));
    assert!(response.suggestions.contains(&"Hero".to_string()));
    assert!(response.suggestions.contains(&"Header".to_string()));
    assert_eq!(p.component("Hero"), HERO);
    assert_eq!(p.component("Header"), HEADER);
}

#[tokio::test]
async fn multi_operation_reply_runs_sequentially_past_a_failure() {
    let reply = r##"{"decisions": [
        {"tool": "content-edit", "confidence": 0.9, "reasoning": "headline",
         "instructions": {"component": "Hero", "oldValue": "Ship faster", "newValue": "Ship today"}},
        {"tool": "content-edit", "confidence": 0.9, "reasoning": "missing element",
         "instructions": {"component": "Header", "selector": "#nope", "newValue": "x"}},
        {"tool": "color-update", "confidence": 0.9, "reasoning": "pricing",
         "instructions": {"component": "Pricing", "color": "green", "property": "background"}}
    ]}"##;
    let p = Project::new(SequentialMockProvider::texts(&[reply]), ScriptedChecker::always_pass());
    let response = p.agent.handle(EditRequest::new("make the page pop")).await;

    assert!(!response.success);
    assert!(response.is_multi_operation);
    assert_eq!(response.decisions.as_ref().map(Vec::len), Some(3));
    let result = response.result.unwrap();
    assert_eq!(result["successfulOperations"], 2);
    assert_eq!(result["failures"][0]["operationIndex"], 2);
    assert_eq!(result["summary"]["percentage"], 67);

    assert!(p.component("Hero").contains("Ship today"));
    assert_eq!(p.component("Header"), HEADER);
    assert!(p.component("Pricing").contains("bg-green-600"));
}

#[tokio::test]
async fn hedged_service_decision_is_provisional() {
    let reply = r#"{"tool": "content-edit", "confidence": 0.5,
        "reasoning": "Unclear which text is meant, assuming the headline",
        "instructions": {"component": "Hero", "selector": "headline", "newValue": "Launch day"}}"#;
    let p = Project::new(SequentialMockProvider::texts(&[reply]), ScriptedChecker::always_pass());
    let response = p.agent.handle(EditRequest::new("make it pop")).await;

    assert!(response.success, "{:?}", response.error);
    assert!(response.provisional);
    assert!(p.component("Hero").contains(">Launch day</h1>"));
}

#[tokio::test]
async fn create_request_generates_and_registers_the_component() {
    let generated = "```tsx\nexport default function Testimonials() {\n  return <section>Quotes</section>;\n}\n```";
    let p = Project::new(SequentialMockProvider::texts(&[generated]), ScriptedChecker::always_pass());
    let response = p
        .agent
        .handle(EditRequest::new("create a section called testimonials below the hero"))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.tool.as_deref(), Some(tool_names::VISUAL_EDIT));
    assert_eq!(response.confidence, Some(1.0));
    assert!(p.component("Testimonials").contains("function Testimonials"));

    let page = p.read("src/app/page.tsx");
    assert!(page.contains(r#"import Testimonials from "@/components/Testimonials";"#));
    let hero = page.find("<Hero />").unwrap();
    let testimonials = page.find("<Testimonials />").unwrap();
    let pricing = page.find("<Pricing />").unwrap();
    assert!(hero < testimonials && testimonials < pricing);
    assert_eq!(p.provider.call_count(), 1);
}

#[tokio::test]
async fn batch_records_unknown_tool_and_continues() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    let bogus = ToolDecision::single("not-a-real-tool", 0.9, "r", InstructionPayload::default());
    let delete = ToolDecision::single(
        tool_names::DELETE,
        1.0,
        "remove pricing",
        InstructionPayload {
            component: Some("Pricing".into()),
            ..Default::default()
        },
    );
    let result = p.agent.handle_batch(vec![bogus, delete], None).await;

    assert!(!result.success);
    assert_eq!(result.successful_operations, 1);
    assert_eq!(result.failures[0].operation_index, 1);
    assert!(result.failures[0].error.contains("UnknownTool"));
    assert!(!p.dir.path().join("src/components/Pricing.tsx").exists());
    assert!(!p.read("src/app/page.tsx").contains("Pricing"));
}

#[tokio::test]
async fn validate_exhausts_in_hard_mode_and_soft_passes_in_soft_mode() {
    let fixes = [HERO, HERO, HERO, HERO, HERO, HERO];
    let p = Project::new(
        SequentialMockProvider::texts(&fixes),
        ScriptedChecker::always_fail("Hero.tsx(3,5): error TS1005: ';' expected."),
    );

    let err = p.agent.validate("Hero", false).await.unwrap_err();
    assert!(matches!(err, AgentError::ValidationExhausted { attempts: 3, .. }));
    assert_eq!(p.checker.invocations(), 4);
    assert_eq!(p.provider.call_count(), 3);

    let report = p.agent.validate("Hero", true).await.unwrap();
    assert_eq!(report.status, ValidationStatus::SoftPass);
    assert_eq!(report.fixes, 3);
    assert_eq!(p.provider.call_count(), 6);
}

#[tokio::test]
async fn validate_unknown_component_is_a_document_error() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    let err = p.agent.validate("Testimonials", false).await.unwrap_err();
    assert!(matches!(err, AgentError::Document { .. }));
    assert_eq!(p.checker.invocations(), 0);
}

#[tokio::test]
async fn classify_is_a_dry_run() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    let report = p
        .agent
        .classify("delete the pricing section", Vec::new())
        .await
        .unwrap();

    assert_eq!(report.intent, Intent::Delete);
    assert_eq!(report.request_type.kind, RequestKind::Standard);
    assert_eq!(report.target.as_deref(), Some("Pricing"));
    assert_eq!(report.known_targets, vec!["Header", "Hero", "Pricing"]);
    assert!(p.dir.path().join("src/components/Pricing.tsx").exists());
    assert_eq!(p.provider.call_count(), 0);
}

#[tokio::test]
async fn tools_lists_the_five_handlers() {
    let p = Project::new(SequentialMockProvider::empty(), ScriptedChecker::always_pass());
    assert_eq!(
        p.agent.tools(),
        vec!["color-update", "content-edit", "delete", "video-embed", "visual-edit"]
    );
}
