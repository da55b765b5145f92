/// Declares a prebuilt analyzer id constant and a from-url / from-file pair
/// that forwards to the generic entry points with that id.
#[macro_export]
macro_rules! impl_prebuilt_analyzer {
    ($modality:literal, $id_const:ident = $analyzer_id:literal, $from_url:ident, $from_file:ident) => {
        pub const $id_const: &str = $analyzer_id;

        impl $crate::ContentUnderstandingClient {
            #[doc = concat!("Analyze ", $modality, " content at `url` with `", $analyzer_id, "`.")]
            pub async fn $from_url(
                &self,
                url: &str,
                options: &$crate::PollOptions,
            ) -> $crate::Result<$crate::models::AnalyzeResult> {
                self.analyze_url($analyzer_id, url, options).await
            }

            #[doc = concat!("Analyze a local ", $modality, " file with `", $analyzer_id, "`.")]
            pub async fn $from_file(
                &self,
                path: impl AsRef<::std::path::Path>,
                options: &$crate::PollOptions,
            ) -> $crate::Result<$crate::models::AnalyzeResult> {
                self.analyze_file($analyzer_id, path, options).await
            }
        }
    };
}
