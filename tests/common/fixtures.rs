//! Test fixtures for saved ChatGPT conversations
//!
//! Trimmed copies of real page snapshots: class lists are shortened but the
//! structure ChatGPT renders (screen-reader headings, author-role wrappers,
//! code block chrome) is kept intact.

/// Older layout: turns are `div`s and code blocks carry a `hljs` class.
pub const LEGACY_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Adding numbers</title></head>
<body>
<main>
  <div class="flex flex-col text-sm">
    <div class="w-full text-token-text-primary" data-testid="conversation-turn-2">
      <h5 class="sr-only">You said:</h5>
      <div class="relative flex w-full flex-col">
        <div data-message-author-role="user" data-message-id="aaa2c1">
          <div class="whitespace-pre-wrap">How do I add two numbers in Python?</div>
        </div>
      </div>
    </div>
    <div class="w-full text-token-text-primary" data-testid="conversation-turn-3">
      <h6 class="sr-only">ChatGPT said:</h6>
      <div data-message-author-role="assistant" data-message-id="4f1e9b">
        <div class="markdown prose w-full break-words dark:prose-invert light">
          <p>Define a function:</p>
          <pre><div class="bg-black rounded-md"><div class="flex items-center relative text-token-text-secondary bg-token-main-surface-secondary px-4 py-2 text-xs font-sans justify-between rounded-t-md">python<button class="flex gap-1 items-center"><svg width="24" height="24"><path d="M12 4"></path></svg>Copy code</button></div><div class="overflow-y-auto p-4" dir="ltr"><code class="!whitespace-pre hljs language-python"><span class="hljs-keyword">def</span> <span class="hljs-title function_">add</span>(<span class="hljs-params">a, b</span>):
    <span class="hljs-keyword">return</span> a + b
</code></div></div></pre>
          <p>Then call <code>add(1, 2)</code>.</p>
        </div>
      </div>
    </div>
  </div>
</main>
</body>
</html>
"#;

/// Current layout: turns are `article`s with sticky copy buttons.
pub const MODERN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Rust hello world</title></head>
<body>
<div class="flex h-full flex-col">
  <article class="w-full text-token-text-primary" dir="auto" data-testid="conversation-turn-1" data-scroll-anchor="false">
    <h5 class="sr-only">You said:</h5>
    <div class="text-base my-auto mx-auto">
      <div data-message-author-role="user" data-message-id="b2d0">
        <div class="whitespace-pre-wrap">Show me a Rust hello world and how to run it.</div>
      </div>
    </div>
  </article>
  <article class="w-full text-token-text-primary" dir="auto" data-testid="conversation-turn-2" data-scroll-anchor="false">
    <h6 class="sr-only">ChatGPT said:</h6>
    <div data-message-author-role="assistant" data-message-id="c7a1" data-message-model-slug="gpt-4o">
      <div class="markdown prose dark:prose-invert w-full break-words dark">
        <p>Here is the program:</p>
        <pre class="overflow-visible!"><div class="contain-inline-size rounded-md border-[0.5px] border-token-border-medium relative bg-token-sidebar-surface-primary"><div class="flex items-center text-token-text-secondary px-4 py-2 text-xs font-sans justify-between h-9 select-none rounded-t-[5px]">rust</div><div class="sticky top-9"><div class="absolute end-0 bottom-0 flex h-9 items-center pe-2"><div class="bg-token-bg-elevated-secondary text-token-text-secondary flex items-center gap-4 rounded-sm px-2 font-sans text-xs"><button class="flex gap-1 items-center select-none py-1" aria-label="Copy"><svg width="24" height="24" viewBox="0 0 24 24"><path d="M7 5"></path></svg>Copy</button></div></div></div><div class="overflow-y-auto p-4" dir="ltr"><code class="whitespace-pre! language-rust"><span><span class="hljs-keyword">fn</span> <span class="hljs-title function_">main</span>() {
    <span class="hljs-built_in">println!</span>(<span class="hljs-string">&quot;Hello, world!&quot;</span>);
}
</span></code></div></div></pre>
        <p>Run it with:</p>
        <pre class="overflow-visible!"><div class="contain-inline-size rounded-md relative"><div class="flex items-center text-token-text-secondary px-4 py-2 text-xs font-sans justify-between h-9">bash</div><div class="overflow-y-auto p-4" dir="ltr"><code class="whitespace-pre! language-bash"><span><span>cargo run
</span></span></code></div></div></pre>
        <p>That prints <strong>Hello, world!</strong> &amp; exits.</p>
      </div>
    </div>
  </article>
  <article class="w-full text-token-text-primary" dir="auto" data-testid="conversation-turn-3" data-scroll-anchor="true">
    <h5 class="sr-only">You said:</h5>
    <div class="text-base my-auto mx-auto">
      <div data-message-author-role="user" data-message-id="d913">
        <div class="whitespace-pre-wrap">Thanks, that worked.</div>
      </div>
    </div>
  </article>
</div>
</body>
</html>
"#;

/// A JSON turn list as produced by a browser-side scraper.
///
/// The second assistant turn is cut off mid-tag, as happens when a snapshot
/// is taken while a reply is still streaming.
pub const TURNS_JSON: &str = r#"[
  {"role": "user", "html": "<div class=\"whitespace-pre-wrap\">List two colors.</div>"},
  {"role": "assistant", "html": "<ul><li>Red</li><li>Blue</li></ul>"},
  {"role": "user", "html": "<div class=\"whitespace-pre-wrap\">Now in CSS?</div>"},
  {"role": "assistant", "hasCodeBlock": true, "rawHtml": "<p>Sure:</p><pre><code class=\"language-css\">.red { color: red; }</code></pre><div class=\"markd"}
]
"#;
