//! Injected `Runtime.evaluate` expressions that walk the live DOM once and
//! serialize it into the JSON shapes `dom-pruner` and `a11y-tree` expect.
//! `returnByValue: true` on the evaluate call hands the result straight back
//! as a `serde_json::Value`, so no `JSON.stringify`/parse round trip is
//! needed on the Rust side.

pub const DOM_WALK_SCRIPT: &str = r#"(() => {
  const MAX_NODES = 4000;
  let count = 0;
  function walk(el) {
    if (!el || count > MAX_NODES) return null;
    count++;
    const style = getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    const children = [];
    for (const child of el.children) {
      const w = walk(child);
      if (w) children.push(w);
    }
    return {
      tag: el.tagName.toLowerCase(),
      attributes: {
        id: el.id || null,
        class: el.className || null,
        role: el.getAttribute('role'),
        aria_label: el.getAttribute('aria-label'),
        aria_describedby: el.getAttribute('aria-describedby'),
        placeholder: el.getAttribute('placeholder'),
        value: el.value !== undefined ? String(el.value) : null,
        href: el.getAttribute('href'),
        test_id: el.getAttribute('data-testid'),
        cy_id: el.getAttribute('data-cy'),
        tabindex: el.hasAttribute('tabindex') ? parseInt(el.getAttribute('tabindex'), 10) : null,
        element_type: el.getAttribute('type'),
        has_onclick: !!el.onclick || el.hasAttribute('onclick'),
      },
      style: {
        display: style.display,
        visibility: style.visibility,
        opacity: parseFloat(style.opacity),
        cursor: style.cursor,
      },
      rect: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
      text: (el.innerText || el.textContent || '').trim().slice(0, 200),
      children,
    };
  }
  return walk(document.body);
})()"#;

pub const A11Y_WALK_SCRIPT: &str = r#"(() => {
  const MAX_NODES = 2000;
  let count = 0;
  function labelledByText(el) {
    const ids = (el.getAttribute('aria-labelledby') || '').split(/\s+/).filter(Boolean);
    if (ids.length === 0) return null;
    return ids.map(id => { const n = document.getElementById(id); return n ? n.textContent.trim() : ''; }).join(' ').trim() || null;
  }
  function describedByText(el) {
    const ids = (el.getAttribute('aria-describedby') || '').split(/\s+/).filter(Boolean);
    if (ids.length === 0) return null;
    return ids.map(id => { const n = document.getElementById(id); return n ? n.textContent.trim() : ''; }).join(' ').trim() || null;
  }
  function labelText(el) {
    if (!el.id) return null;
    const label = document.querySelector(`label[for="${el.id}"]`);
    return label ? label.textContent.trim() : null;
  }
  function walk(el) {
    if (!el || count > MAX_NODES) return null;
    count++;
    const style = getComputedStyle(el);
    const hidden = style.display === 'none' || style.visibility === 'hidden' || el.hasAttribute('hidden') || el.getAttribute('aria-hidden') === 'true';
    const children = [];
    for (const child of el.children) {
      const w = walk(child);
      if (w) children.push(w);
    }
    return {
      tag: el.tagName.toLowerCase(),
      attributes: {
        id: el.id || null,
        role: el.getAttribute('role'),
        aria_label: el.getAttribute('aria-label'),
        aria_labelledby_text: labelledByText(el),
        label_text: labelText(el),
        aria_describedby_text: describedByText(el),
        placeholder: el.getAttribute('placeholder'),
        alt: el.getAttribute('alt'),
        title: el.getAttribute('title'),
        href: el.getAttribute('href'),
        element_type: el.getAttribute('type'),
        value: el.value !== undefined ? String(el.value) : null,
        disabled: !!el.disabled,
        focused: document.activeElement === el,
      },
      text: (el.innerText || el.textContent || '').trim().slice(0, 200),
      hidden,
      children,
    };
  }
  return walk(document.body);
})()"#;

pub const METADATA_SCRIPT: &str = r#"(() => ({
  url: location.href,
  title: document.title,
  readyState: document.readyState,
  scrollX: window.scrollX,
  scrollY: window.scrollY,
  width: window.innerWidth,
  height: window.innerHeight,
}))()"#;
