use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::clients::transport::{HttpRequest, decode};
use crate::error::Result;
use crate::models::analysis_client::{ContentUnderstandingClient, validate_analyzer_id};
use crate::models::{AnalyzerDefinition, AnalyzerList, AnalyzerResponse};

impl ContentUnderstandingClient {
    /// Creates `analyzer_id`, fully replacing any analyzer already stored
    /// under that id.
    #[instrument(skip(self, definition, cancel))]
    pub async fn create_or_replace_analyzer(
        &self,
        analyzer_id: &str,
        definition: &AnalyzerDefinition,
        cancel: &CancellationToken,
    ) -> Result<AnalyzerResponse> {
        validate_analyzer_id(analyzer_id)?;
        if let Some(schema) = &definition.field_schema {
            schema.validate()?;
        }

        let url = self.service_url(&format!("analyzers/{analyzer_id}"));
        let request = HttpRequest::new(Method::PUT, url).with_json(definition)?;
        let response = self.execute(request, "create analyzer", cancel).await?;

        info!(
            analyzer_id = analyzer_id,
            status_code = response.status.as_u16(),
            "Analyzer created or replaced"
        );
        decode(&response, "analyzer")
    }

    /// A missing analyzer surfaces as a service error with status 404.
    #[instrument(skip(self, cancel))]
    pub async fn get_analyzer(
        &self,
        analyzer_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalyzerResponse> {
        validate_analyzer_id(analyzer_id)?;
        let url = self.service_url(&format!("analyzers/{analyzer_id}"));
        let response = self
            .execute(HttpRequest::new(Method::GET, url), "get analyzer", cancel)
            .await?;
        decode(&response, "analyzer")
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete_analyzer(&self, analyzer_id: &str, cancel: &CancellationToken) -> Result<()> {
        validate_analyzer_id(analyzer_id)?;
        let url = self.service_url(&format!("analyzers/{analyzer_id}"));
        let response = self
            .execute(HttpRequest::new(Method::DELETE, url), "delete analyzer", cancel)
            .await?;

        info!(
            analyzer_id = analyzer_id,
            status_code = response.status.as_u16(),
            "Analyzer deleted"
        );
        Ok(())
    }

    /// Every analyzer on the resource, following `nextLink` pages.
    #[instrument(skip(self, cancel))]
    pub async fn list_analyzers(&self, cancel: &CancellationToken) -> Result<Vec<AnalyzerResponse>> {
        let mut analyzers = Vec::new();
        let mut next = Some(self.service_url("analyzers"));

        while let Some(url) = next {
            let response = self
                .execute(HttpRequest::new(Method::GET, url), "list analyzers", cancel)
                .await?;
            let page: AnalyzerList = decode(&response, "analyzer list")?;
            analyzers.extend(page.value);
            next = page.next_link;
        }
        Ok(analyzers)
    }
}
