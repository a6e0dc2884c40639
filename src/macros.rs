#[macro_export]
/// Make a GET request expecting JSON.
/// if JSON deser fails, emit a `WARN` level tracing event
macro_rules! json_get {
    ($client:expr, $url:expr, $expected:ty,) => {
        $crate::json_get!($client, $url, $expected)
    };
    ($client:expr, $url:expr, $expected:ty) => {{
        let url = $url;
        let resp = $client.get(url.clone()).send().await?.error_for_status()?;
        let text = resp.text().await?;

        let result = serde_json::from_str::<$expected>(&text)
            .map_err(Into::<$crate::oracle::LookupError>::into);

        if result.is_err() {
            tracing::warn!(
                method = "GET",
                url = %url,
                response = text.as_str(),
                "Unexpected response from server"
            );
        }
        result
    }};
}
