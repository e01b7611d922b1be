use std::path::Path;

const DEFAULT_API: &'static str = "http://localhost:3000";

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: upload <bucket> <file>");
    eprintln!("  bucket: images | audio-files");
    std::process::exit(1);
}

/// 按扩展名推断 Content-Type
fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => return None,
    };
    Some(mime)
}

fn main() {
    let mut args = std::env::args().skip(1); // 跳过程序名

    let bucket = args.next().unwrap_or_else(|| {
        eprintln!("Missing <bucket>");
        print_usage_and_exit();
    });

    let file = args.next().unwrap_or_else(|| {
        eprintln!("Missing <file>");
        print_usage_and_exit();
    });

    if args.next().is_some() {
        eprintln!("Too many arguments provided.");
        print_usage_and_exit();
    }

    let path = Path::new(&file);
    let Some(mime) = content_type(path) else {
        eprintln!("❌ Unsupported file type: {}", file);
        std::process::exit(1);
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    let bytes = std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("❌ Failed to read {}: {}", file, e);
        std::process::exit(1);
    });

    let api = std::env::var("DARSA_API").unwrap_or_else(|_| DEFAULT_API.to_string());
    let key = std::env::var("DARSA_ADMIN_KEY").unwrap_or_default();

    let client = reqwest::blocking::Client::new();
    let res = client
        .post(format!("{}/api/media/{}", api.trim_end_matches('/'), bucket))
        .query(&[("name", name.as_str())])
        .bearer_auth(key)
        .header(reqwest::header::CONTENT_TYPE, mime)
        .body(bytes)
        .send();

    match res {
        Ok(resp) => {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            if !status.is_success() {
                eprintln!("❌ Upload rejected");
                eprintln!("{} | {}", status, text.trim());
                std::process::exit(1);
            }

            let url = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["publicUrl"].as_str().map(str::to_string));
            match url {
                Some(url) => println!("{}", url),
                None => println!("{}", text.trim()),
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to contact API: {}", e);
            std::process::exit(1);
        }
    }
}
