//! The injected capture-phase event tracker (§4.4).
//!
//! A single idempotent IIFE, installed via both
//! `Page.addScriptToEvaluateOnNewDocument` (so it survives navigations) and
//! a one-off `Runtime.evaluate` against the current page. Every captured
//! event is serialized as a single `console.info` call prefixed
//! `[BROWZER_ACTION]` followed by a JSON payload — a CSP-proof exfiltration
//! channel the host observes via `Runtime.consoleAPICalled`, so no page
//! script needs network access to report back.

pub const TRACKER_SCRIPT: &str = r#"(() => {
  if (window.__browzerRecorderInstalled) return;
  window.__browzerRecorderInstalled = true;

  const IMPORTANT_KEYS = new Set([
    'Enter', 'Escape', 'Tab', 'Backspace', 'Delete',
    'ArrowUp', 'ArrowDown', 'ArrowLeft', 'ArrowRight',
    'Home', 'End', 'PageUp', 'PageDown',
  ]);
  const INTERACTIVE_TAGS = new Set(['A', 'BUTTON', 'INPUT', 'SELECT', 'TEXTAREA', 'LABEL']);
  const INTERACTIVE_ROLES = new Set([
    'button', 'link', 'textbox', 'searchbox', 'combobox', 'checkbox', 'radio',
    'menuitem', 'tab', 'switch',
  ]);
  const IMMEDIATE_INPUT_TYPES = new Set(['checkbox', 'radio', 'file', 'range', 'color']);
  const inputTimers = new Map();

  function report(type, payload) {
    try {
      console.info('[BROWZER_ACTION]', JSON.stringify({ type, timestamp: Date.now(), ...payload }));
    } catch (e) {
      // swallow: a circular/non-serializable payload must never break the page
    }
  }

  function isInteractive(el) {
    if (!el || !el.tagName) return false;
    if (INTERACTIVE_TAGS.has(el.tagName)) return true;
    const role = el.getAttribute && el.getAttribute('role');
    if (role && INTERACTIVE_ROLES.has(role.toLowerCase())) return true;
    if (el.onclick || (el.hasAttribute && el.hasAttribute('onclick'))) return true;
    if (getComputedStyle(el).cursor === 'pointer') return true;
    const tabindex = el.getAttribute && el.getAttribute('tabindex');
    if (tabindex !== null && tabindex !== undefined && parseInt(tabindex, 10) >= 0) return true;
    return false;
  }

  function findInteractiveAncestor(el) {
    let node = el;
    for (let i = 0; i <= 5 && node; i++, node = node.parentElement) {
      if (isInteractive(node)) return node;
    }
    return null;
  }

  function targetOf(el) {
    if (!el) return null;
    return {
      tagName: el.tagName,
      text: (el.innerText || el.textContent || '').trim().slice(0, 100) || null,
      ariaLabel: el.getAttribute ? el.getAttribute('aria-label') : null,
    };
  }

  function visibleModalCount() {
    return document.querySelectorAll('[role="dialog"], [role="alertdialog"], .modal.show, .modal.open').length;
  }

  document.addEventListener('click', (ev) => {
    const interactive = findInteractiveAncestor(ev.target);
    report('click', {
      target: targetOf(interactive || ev.target),
      metadata: interactive && interactive !== ev.target ? { clickedElement: targetOf(ev.target) } : undefined,
      position: { x: ev.clientX, y: ev.clientY },
      preState: {
        url: location.href,
        scrollX: window.scrollX,
        scrollY: window.scrollY,
        activeTag: document.activeElement ? document.activeElement.tagName : null,
        modalCount: visibleModalCount(),
      },
    });
  }, true);

  document.addEventListener('input', (ev) => {
    const el = ev.target;
    if (!el || !el.tagName) return;
    const type = (el.getAttribute('type') || 'text').toLowerCase();
    const key = el.id || el.name || el.getAttribute('data-testid') || '';
    const emit = () => report('input', {
      target: targetOf(el),
      value: el.value,
      metadata: { fieldType: type },
    });
    if (IMMEDIATE_INPUT_TYPES.has(type)) {
      emit();
      return;
    }
    clearTimeout(inputTimers.get(key));
    inputTimers.set(key, setTimeout(emit, 500));
  }, true);

  document.addEventListener('change', (ev) => {
    const el = ev.target;
    if (!el || !el.tagName) return;
    const tag = el.tagName.toLowerCase();
    if (tag === 'select') {
      const options = Array.from(el.selectedOptions || []);
      report('select', {
        target: targetOf(el),
        metadata: {
          multiple: !!el.multiple,
          selectedValues: options.map((o) => o.value),
          selectedTexts: options.map((o) => o.text),
        },
      });
    } else if (tag === 'input' && (el.type === 'checkbox')) {
      report('checkbox', { target: targetOf(el), value: String(el.checked) });
    } else if (tag === 'input' && el.type === 'radio') {
      report('radio', { target: targetOf(el), value: el.value });
    } else if (tag === 'input' && el.type === 'file') {
      const files = Array.from(el.files || []);
      report('file_upload', {
        target: targetOf(el),
        metadata: { files: files.map((f) => ({ name: f.name, size: f.size, type: f.type })) },
      });
    }
  }, true);

  document.addEventListener('submit', (ev) => {
    const form = ev.target;
    const data = {};
    try {
      new FormData(form).forEach((value, key) => {
        data[key] = typeof value === 'string' ? value : '[file]';
      });
    } catch (e) {
      // form data unavailable, proceed with empty data
    }
    report('submit', { target: targetOf(form), metadata: { formData: data } });
  }, true);

  document.addEventListener('keydown', (ev) => {
    const hasModifier = ev.ctrlKey || ev.metaKey || ev.altKey || ev.shiftKey;
    if (!hasModifier && !IMPORTANT_KEYS.has(ev.key)) return;
    report('keypress', {
      target: targetOf(ev.target),
      value: ev.key,
      metadata: { ctrlKey: ev.ctrlKey, metaKey: ev.metaKey, altKey: ev.altKey, shiftKey: ev.shiftKey },
    });
  }, true);
})()"#;
